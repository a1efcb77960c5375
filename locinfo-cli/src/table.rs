use locinfo_core::Row;
use unicode_width::UnicodeWidthStr;

/// Bordered ASCII table with a separator line between every row.
///
/// Column widths are measured in terminal columns, so Cyrillic and CJK
/// text line up.
pub fn ascii_table(rows: &[Row]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.width())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');

    for row in rows {
        out.push('|');
        for (col, width) in widths.iter().enumerate() {
            let cell = row.get(col).map(String::as_str).unwrap_or("");
            let pad = width - cell.width();
            out.push(' ');
            out.push_str(cell);
            out.push_str(&" ".repeat(pad + 1));
            out.push('|');
        }
        out.push('\n');
        out.push_str(&border);
        out.push('\n');
    }

    out.pop();
    out
}
