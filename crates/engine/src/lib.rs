pub mod cell;
pub mod history;
pub mod sheet;
pub mod tsv;

pub use cell::{Cell, CellMeta};
pub use history::{CellChange, CellWrite, History, LogMode, Transaction, TransactionScope};
pub use sheet::Sheet;
