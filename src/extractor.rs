use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{error, info};
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::{Number, Value};

use crate::error::{Result, ScrapeError};
use crate::records::{DetailRecord, RankedCompany};
use crate::store::read_json;

const EARNINGS_LABEL: &str = "Lợi nhuận sau thuế của công ty mẹ";
const REVENUE_LABEL: &str = "Doanh thu bán hàng và CCDV";
const MARKET_CAP_LABEL: &str = "Vốn hóa thị trường";

/// Turns the saved detail pages into per-company records.
pub trait DetailExtractor {
    fn extract(&self, html_dir: &Path) -> Result<Vec<DetailRecord>>;
}

/// Parses `company_<n>.html` pages in-process.
///
/// The page index `n` is taken as the company's ranking, so pages are
/// matched back to the filtered list by `Ranking == n`.
pub struct HtmlExtractor {
    companies: Vec<RankedCompany>,
    file_regex: Regex,
    int_regex: Regex,
    float_regex: Regex,
}

impl HtmlExtractor {
    pub fn new(companies: Vec<RankedCompany>) -> Self {
        HtmlExtractor {
            companies,
            file_regex: Regex::new(r"^company_(\d+)\.html$").unwrap(),
            // Leading-number parsing: "1234abc" reads as 1234, "-" as nothing.
            int_regex: Regex::new(r"^[+-]?\d+").unwrap(),
            float_regex: Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap(),
        }
    }

    fn page_index(&self, file_name: &str) -> Option<i64> {
        self.file_regex
            .captures(file_name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    pub fn parse_int(&self, text: &str) -> Option<i64> {
        let cleaned = text.trim().replace(',', "");
        self.int_regex.find(&cleaned).and_then(|m| m.as_str().parse().ok())
    }

    pub fn parse_float(&self, text: &str) -> Option<f64> {
        let cleaned = text.trim().replace(',', "");
        self.float_regex.find(&cleaned).and_then(|m| m.as_str().parse().ok())
    }

    /// Extracts one page. Ranking and name are filled in by the caller.
    pub fn parse_page(&self, html: &str) -> DetailRecord {
        let document = Html::parse_document(html);
        let row_selector = Selector::parse("tr").unwrap();
        let li_selector = Selector::parse("li").unwrap();

        let mut details = DetailRecord::default();

        if let Some(row) = find_containing(&document, &row_selector, EARNINGS_LABEL) {
            details.earnings = self.row_values(row);
            details.total_profit = checked_sum(&details.earnings);
        }

        if let Some(row) = find_containing(&document, &row_selector, REVENUE_LABEL) {
            details.revenue = self.row_values(row);
        }
        details.total_revenue = checked_sum(&details.revenue);

        if let Some(item) = find_containing(&document, &li_selector, MARKET_CAP_LABEL) {
            let fragments = child_texts(item);
            details.market_cap = fragments.get(1).and_then(|t| self.parse_float(t));
        }

        details
    }

    /// Non-empty `<td>` cells of a row, minus the leading label cell.
    fn row_values(&self, row: ElementRef) -> Vec<Value> {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .map(|td| td.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .skip(1)
            .map(|text| self.parse_int(&text).map_or(Value::Null, Value::from))
            .collect()
    }
}

impl DetailExtractor for HtmlExtractor {
    fn extract(&self, html_dir: &Path) -> Result<Vec<DetailRecord>> {
        let mut records = Vec::new();

        for entry in fs::read_dir(html_dir)? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(index) = self.page_index(&file_name) else {
                continue;
            };

            let Some(company) = self.companies.iter().find(|c| c.ranking == Some(index)) else {
                error!("Company with ranking {} not found in filtered companies.", index);
                continue;
            };

            let html = match fs::read_to_string(entry.path()) {
                Ok(h) => h,
                Err(e) => {
                    error!("Error reading file {}: {}", file_name, e);
                    continue;
                }
            };

            let mut details = self.parse_page(&html);
            details.ranking = company.ranking;
            details.company_name = Some(company.company_name.clone());
            records.push(details);
        }

        records.sort_by_key(|r| r.ranking);
        info!("Extracted details for {} companies.", records.len());
        Ok(records)
    }
}

/// Runs an external program that writes `details_path`, then loads it.
pub struct ScriptExtractor {
    command: Vec<String>,
    work_dir: PathBuf,
    details_path: PathBuf,
}

impl ScriptExtractor {
    pub fn new(command: Vec<String>, work_dir: PathBuf, details_path: PathBuf) -> Self {
        ScriptExtractor { command, work_dir, details_path }
    }
}

impl DetailExtractor for ScriptExtractor {
    fn extract(&self, _html_dir: &Path) -> Result<Vec<DetailRecord>> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| ScrapeError::Subprocess("empty extractor command".to_string()))?;

        info!("Running extractor: {}", self.command.join(" "));
        let status = Command::new(program)
            .args(args)
            .current_dir(&self.work_dir)
            .status()
            .map_err(|e| ScrapeError::Subprocess(format!("could not start '{}': {}", program, e)))?;

        if !status.success() {
            return Err(ScrapeError::Subprocess(format!("'{}' exited with {}", self.command.join(" "), status)));
        }
        info!("Extractor finished successfully.");

        read_json(&self.details_path)
            .map_err(|e| ScrapeError::Merge(format!("reading {:?}: {}", self.details_path, e)))
    }
}

fn find_containing<'a>(document: &'a Html, selector: &Selector, needle: &str) -> Option<ElementRef<'a>> {
    document
        .select(selector)
        .find(|el| el.text().collect::<String>().contains(needle))
}

/// Trimmed, non-empty text of each direct child node (elements and bare text alike).
fn child_texts(element: ElementRef) -> Vec<String> {
    element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(text.to_string()),
            Node::Element(_) => ElementRef::wrap(child).map(|el| el.text().collect::<String>()),
            _ => None,
        })
        .map(|t| t.trim().replace(',', ""))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Sum of all values, or `None` if any value failed to parse or the total overflows.
fn checked_sum(values: &[Value]) -> Option<Number> {
    values
        .iter()
        .try_fold(0i64, |acc, v| v.as_i64().and_then(|x| acc.checked_add(x)))
        .map(Number::from)
}
