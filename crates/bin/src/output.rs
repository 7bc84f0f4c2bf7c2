//! Output formatting helpers for human-readable and JSON output.

use serde::Serialize;
use shelf_layout::{Cabinet, Lane, Product, Row};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }
}

/// Print a value as a single line of JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let render = |cells: &mut dyn Iterator<Item = &str>| {
        cells
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", render(&mut headers.iter().copied()));
    for row in rows {
        println!("{}", render(&mut row.iter().take(col_count).map(String::as_str)));
    }
}

/// One line per lane, flattened across rows.
pub fn print_lanes(cabinet: u32, rows: &[Row]) {
    let lines: Vec<Vec<String>> = rows
        .iter()
        .flat_map(|row| {
            row.lanes
                .iter()
                .map(move |lane| lane_line(cabinet, row.number, lane))
        })
        .collect();
    if lines.is_empty() {
        println!("No lanes.");
        return;
    }
    print_table(&["CABINET", "ROW", "LANE", "JAN CODE", "QTY"], &lines);
}

fn lane_line(cabinet: u32, row: u32, lane: &Lane) -> Vec<String> {
    vec![
        cabinet.to_string(),
        row.to_string(),
        lane.number.to_string(),
        lane.jan_code.clone(),
        lane.quantity.to_string(),
    ]
}

pub fn print_cabinets(cabinets: &[Cabinet]) {
    if cabinets.is_empty() {
        println!("No cabinets found.");
        return;
    }
    let lines: Vec<Vec<String>> = cabinets
        .iter()
        .map(|cabinet| {
            vec![
                cabinet.number.to_string(),
                format!(
                    "{},{},{}",
                    cabinet.position.x, cabinet.position.y, cabinet.position.z
                ),
                cabinet.rows.len().to_string(),
                cabinet
                    .rows
                    .iter()
                    .map(|row| row.lanes.len())
                    .sum::<usize>()
                    .to_string(),
            ]
        })
        .collect();
    print_table(&["NUMBER", "POSITION", "ROWS", "LANES"], &lines);
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    let lines: Vec<Vec<String>> = products
        .iter()
        .map(|product| {
            vec![
                product.jan_code.clone(),
                product.name.clone(),
                product.shape.clone(),
                product.size.to_string(),
            ]
        })
        .collect();
    print_table(&["JAN CODE", "NAME", "SHAPE", "SIZE"], &lines);
}
