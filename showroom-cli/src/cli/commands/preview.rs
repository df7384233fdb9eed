//! Plain-text preview of uploaded rows

use colored::*;

use crate::discount::{Field, RawDataset};

/// Render the first `limit` rows as an aligned table of the known columns
pub fn render_preview(dataset: &RawDataset, limit: usize) -> String {
    let fields: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|f| dataset.has_column(*f))
        .collect();

    let mut table: Vec<Vec<String>> = Vec::new();
    let mut header = vec!["#".to_string()];
    header.extend(fields.iter().map(|f| f.name().to_string()));
    table.push(header);

    for row in dataset.rows.iter().take(limit) {
        let mut line = vec![row.number.to_string()];
        line.extend(fields.iter().map(|f| row.get(*f).to_string()));
        table.push(line);
    }

    let widths: Vec<usize> = (0..table[0].len())
        .map(|col| {
            table
                .iter()
                .map(|line| line[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (idx, line) in table.iter().enumerate() {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        let text = cells.join("  ");
        if idx == 0 {
            out.push_str(&text.bold().to_string());
        } else {
            out.push_str(&text);
        }
        out.push('\n');
    }

    if dataset.row_count() > limit {
        let more = format!("... {} more rows", dataset.row_count() - limit);
        out.push_str(&more.dimmed().to_string());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::types::Cell;

    #[test]
    fn test_preview_limits_rows() {
        colored::control::set_override(false);

        let header = vec!["c_code".to_string(), "flash_price".to_string()];
        let rows = (1..=3).map(|i| {
            vec![
                Cell::from_text(&format!("c-00{}", i)),
                Cell::from_text("25000"),
            ]
        });
        let dataset = RawDataset::from_rows(header, rows);

        let preview = render_preview(&dataset, 2);
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].trim_end(), "#  c_code  flash_price");
        assert_eq!(lines[1].trim_end(), "1  c-001   25000");
        assert_eq!(lines[3], "... 1 more rows");
    }
}
