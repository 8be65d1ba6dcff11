use crate::error::OutputError;
use crate::types::ChartRow;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), OutputError> {
    let csv_err = |source: csv::Error| OutputError::Csv {
        path: path.to_string(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    for r in rows {
        wtr.serialize(r).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.to_string(),
        source,
    })
}

/// Write the date pivot with one column per person; blank cells mean the
/// person has no run on that date.
pub fn write_chart_csv(path: &str, people: &[String], rows: &[ChartRow]) -> Result<(), OutputError> {
    let csv_err = |source: csv::Error| OutputError::Csv {
        path: path.to_string(),
        source,
    };
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;
    let mut header = vec!["date".to_string(), "display_date".to_string()];
    header.extend(people.iter().cloned());
    wtr.write_record(&header).map_err(csv_err)?;
    for row in rows {
        wtr.write_record(chart_cells(row)).map_err(csv_err)?;
    }
    wtr.flush().map_err(|source| OutputError::Io {
        path: path.to_string(),
        source,
    })
}

fn chart_cells(row: &ChartRow) -> Vec<String> {
    let mut cells = vec![row.date.clone(), row.display_date.clone()];
    cells.extend(
        row.cells
            .iter()
            .map(|c| c.map(|v| format!("{:.2}", v)).unwrap_or_default()),
    );
    cells
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), OutputError> {
    let s = serde_json::to_string_pretty(value).map_err(|source| OutputError::Json {
        path: path.to_string(),
        source,
    })?;
    std::fs::write(path, s).map_err(|source| OutputError::Io {
        path: path.to_string(),
        source,
    })
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn preview_chart_rows(people: &[String], rows: &[ChartRow], max_rows: usize) {
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    let mut header = vec!["date".to_string(), "display_date".to_string()];
    header.extend(people.iter().cloned());
    builder.push_record(header);
    for row in rows.iter().take(max_rows) {
        builder.push_record(chart_cells(row));
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
