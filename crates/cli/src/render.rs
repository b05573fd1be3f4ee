use tabula_core::SortIndicator;
use tabula_view::{HeaderCell, Row};

fn header_text(h: &HeaderCell) -> String {
    match h.indicator {
        SortIndicator::Ascending => format!("{} ▲", h.label),
        SortIndicator::Descending => format!("{} ▼", h.label),
        SortIndicator::None => h.label.clone(),
    }
}

/// Plain text table with left-aligned columns sized to their widest cell.
pub fn table(headers: &[HeaderCell], rows: &[Row]) -> String {
    let head: Vec<String> = headers.iter().map(header_text).collect();
    let body: Vec<Vec<String>> = rows.iter().map(|r| r.cells.iter().map(|c| c.to_string()).collect()).collect();
    let mut widths: Vec<usize> = head.iter().map(|h| h.chars().count()).collect();
    for cells in body.iter() {
        for (w, c) in widths.iter_mut().zip(cells.iter()) {
            *w = (*w).max(c.chars().count());
        }
    }
    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{}{}", c, " ".repeat(w.saturating_sub(c.chars().count()))))
            .collect();
        padded.join("  ").trim_end().to_string()
    };
    let mut out = line(&head);
    out.push('\n');
    for cells in body.iter() {
        out.push_str(&line(cells));
        out.push('\n');
    }
    out
}
