//! Tab/newline-delimited blocks, the format spreadsheets paste natively.

/// Render rows as TSV: `\t` between columns, `\n` between rows, no trailing newline.
pub fn render(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split TSV text into rows of raw (untrimmed) values.
///
/// CRLF line endings are accepted and a single trailing line break is ignored,
/// so text copied from another spreadsheet does not add a phantom row.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    if text.is_empty() {
        return Vec::new();
    }
    let body = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    body.split('\n')
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .split('\t')
                .map(str::to_string)
                .collect()
        })
        .collect()
}
