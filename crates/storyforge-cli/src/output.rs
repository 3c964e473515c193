use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Two-column `| Metric | Count |` markdown table.
pub fn print_metrics(rows: &[(&str, String)]) {
    let label_width = rows
        .iter()
        .map(|(label, _)| label.len())
        .chain(std::iter::once("Metric".len()))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, value)| value.len())
        .chain(std::iter::once("Count".len()))
        .max()
        .unwrap_or(0);

    println!("| {:label_width$} | {:value_width$} |", "Metric", "Count");
    println!("|{}|{}|", "-".repeat(label_width + 2), "-".repeat(value_width + 2));
    for (label, value) in rows {
        println!("| {:label_width$} | {:value_width$} |", label, value);
    }
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  "));

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}
