use std::io::IsTerminal;

use colored_json::prelude::*;
use haku_common::{HistoryRecord, SearchOutcome, SizeUnit};
use prettytable::{Cell, Row, Table, format};
use serde::Serialize;

pub fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json_string = serde_json::to_string_pretty(data)?;

    if std::io::stdout().is_terminal() {
        println!("{}", json_string.to_colored_json_auto()?);
    } else {
        println!("{}", json_string);
    }

    Ok(())
}

/// Result table; sizes are converted out of the KB base unit into the
/// unit the user asked for, two decimals.
pub fn print_hits(outcome: &SearchOutcome, unit: SizeUnit) {
    if outcome.hits.is_empty() {
        println!(
            "No files found ({:.2} seconds)",
            outcome.elapsed_seconds
        );
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    table.add_row(Row::new(vec![
        Cell::new("Name").style_spec("Fb"),
        Cell::new("Path").style_spec("Fb"),
        Cell::new(&format!("Size ({})", unit.label())).style_spec("Fb"),
        Cell::new("Created").style_spec("Fb"),
        Cell::new("Modified").style_spec("Fb"),
    ]));

    for hit in &outcome.hits {
        table.add_row(Row::new(vec![
            Cell::new(&hit.name),
            Cell::new(&hit.path.display().to_string()),
            Cell::new(&format!("{:.2}", unit.from_kb(hit.size_kb))),
            Cell::new(&hit.created.format("%Y-%m-%d %H:%M:%S").to_string()),
            Cell::new(&hit.modified.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]));
    }

    table.printstd();
    println!(
        "Found {} files in {:.2} seconds",
        outcome.hits.len(),
        outcome.elapsed_seconds
    );
}

pub fn print_history(records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("No search history");
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);

    table.add_row(Row::new(vec![
        Cell::new("#").style_spec("Fb"),
        Cell::new("Time").style_spec("Fb"),
        Cell::new("Folder").style_spec("Fb"),
        Cell::new("Date range").style_spec("Fb"),
        Cell::new("File type").style_spec("Fb"),
        Cell::new("Size range").style_spec("Fb"),
    ]));

    for (i, record) in records.iter().enumerate() {
        let c = &record.criteria;
        table.add_row(Row::new(vec![
            Cell::new(&(i + 1).to_string()),
            Cell::new(&record.timestamp),
            Cell::new(&c.folder.display().to_string()),
            Cell::new(&format!("{} to {}", c.date_from, c.date_to)),
            Cell::new(c.file_type.label()),
            Cell::new(&c.size_range_display()),
        ]));
    }

    table.printstd();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        size_kb: f64,
    }

    #[test]
    fn json_output_accepts_any_serializable_records() {
        let samples = vec![
            Sample {
                name: "a.jpg",
                size_kb: 2.0,
            },
            Sample {
                name: "b.png",
                size_kb: 150.5,
            },
        ];
        assert!(print_json(&samples).is_ok());
    }
}
