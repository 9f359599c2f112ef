use std::collections::BTreeSet;
use std::path::Path;

use log::{error, info};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Number, Value};

use crate::error::{Result, ScrapeError};
use crate::records::MergedCompany;

/// Columns every export starts with; extra detail keys follow in sorted order.
pub const CANONICAL_COLUMNS: [&str; 11] = [
    "Ranking",
    "CompanyName",
    "NopNganSach",
    "Link",
    "Industry",
    "Type",
    "TotalProfit",
    "MarketCap",
    "Revenue",
    "TotalRevenue",
    "FullEarnings",
];

const LIST_SEPARATOR: &str = "; ";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => if *b { "True".to_string() } else { "False".to_string() },
            Cell::Text(s) => s.clone(),
        }
    }
}

/// A header plus one row per company, all rows the header's width.
#[derive(Debug, Clone)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn from_merged(merged: &[MergedCompany]) -> Self {
        let extra_keys: BTreeSet<&String> = merged
            .iter()
            .filter_map(|m| m.details.as_ref())
            .flat_map(|d| d.extra.keys())
            .filter(|k| !CANONICAL_COLUMNS.contains(&k.as_str()))
            .collect();

        let mut header: Vec<String> = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.extend(extra_keys.iter().map(|k| k.to_string()));

        let rows = merged
            .iter()
            .map(|m| {
                let c = &m.company;
                let d = m.details.as_ref();
                let mut row = vec![
                    c.ranking.map_or(Cell::Empty, Cell::Int),
                    Cell::Text(c.company_name.clone()),
                    c.nop_ngan_sach.map_or(Cell::Empty, Cell::Float),
                    Cell::Text(c.link.clone()),
                    Cell::Text(c.industry.clone()),
                    Cell::Text(c.kind.clone()),
                    d.and_then(|d| d.total_profit.as_ref()).map_or(Cell::Empty, number_cell),
                    d.and_then(|d| d.market_cap).map_or(Cell::Empty, Cell::Float),
                    d.map_or(Cell::Empty, |d| Cell::Text(join_values(&d.revenue))),
                    d.and_then(|d| d.total_revenue.as_ref()).map_or(Cell::Empty, number_cell),
                    Cell::Bool(m.full_earnings),
                ];
                for key in &extra_keys {
                    let value = d.and_then(|d| d.extra.get(key.as_str()));
                    row.push(value.map_or(Cell::Empty, value_cell));
                }
                row
            })
            .collect();

        Table { header, rows }
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

fn number_cell(n: &Number) -> Cell {
    match n.as_i64() {
        Some(i) => Cell::Int(i),
        None => n.as_f64().map_or(Cell::Empty, Cell::Float),
    }
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => number_cell(n),
        Value::String(s) => Cell::Text(s.clone()),
        Value::Array(items) => Cell::Text(join_values(items)),
        Value::Object(_) => Cell::Text(value.to_string()),
    }
}

fn export_error(path: &Path, reason: impl ToString) -> ScrapeError {
    ScrapeError::Export { path: path.display().to_string(), reason: reason.to_string() }
}

pub fn export_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| export_error(path, e))?;
    writer.write_record(&table.header).map_err(|e| export_error(path, e))?;
    for row in &table.rows {
        writer
            .write_record(row.iter().map(Cell::as_text))
            .map_err(|e| export_error(path, e))?;
    }
    writer.flush().map_err(|e| export_error(path, e))?;
    Ok(())
}

pub fn export_xlsx(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, name) in table.header.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &bold)
            .map_err(|e| export_error(path, e))?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_idx = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let col = c as u16;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Int(i) => worksheet.write_number(row_idx, col, *i as f64),
                Cell::Float(f) => worksheet.write_number(row_idx, col, *f),
                Cell::Bool(b) => worksheet.write_boolean(row_idx, col, *b),
                Cell::Text(s) => worksheet.write_string(row_idx, col, s),
            };
            written.map_err(|e| export_error(path, e))?;
        }
    }

    workbook.save(path).map_err(|e| export_error(path, e))?;
    Ok(())
}

/// Writes both formats. A failure in one is logged and does not stop the other.
pub fn export(merged: &[MergedCompany], csv_path: &Path, xlsx_path: &Path) -> Vec<ScrapeError> {
    let table = Table::from_merged(merged);
    let mut failures = Vec::new();

    match export_csv(&table, csv_path) {
        Ok(()) => info!("Merged data has been saved to {:?}.", csv_path),
        Err(e) => {
            error!("An error occurred while converting to CSV: {}", e);
            failures.push(e);
        }
    }

    match export_xlsx(&table, xlsx_path) {
        Ok(()) => info!("Merged data has been saved to {:?}.", xlsx_path),
        Err(e) => {
            error!("An error occurred while converting to Excel: {}", e);
            failures.push(e);
        }
    }

    failures
}
