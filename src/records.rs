//! Typed records for each pipeline stage.
//!
//! Field names on disk keep the PascalCase keys of the cafef.vn API and of
//! the legacy `company_details.json` format.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// One entry of the ranking API's `Data.Data` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompany {
    #[serde(rename = "OrderNumber", default)]
    pub order_number: Option<i64>,
    // The API spells it "ComapnyName".
    #[serde(rename = "ComapnyName", alias = "CompanyName", default)]
    pub company_name: Option<String>,
    #[serde(rename = "NopNganSach", default)]
    pub nop_ngan_sach: Option<f64>,
    #[serde(rename = "Link", default)]
    pub link: Option<String>,
    #[serde(rename = "Industry", default)]
    pub industry: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
}

/// Filtered view of a listed company. `ranking` is the join key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedCompany {
    #[serde(rename = "Ranking")]
    pub ranking: Option<i64>,
    #[serde(rename = "CompanyName", default)]
    pub company_name: String,
    #[serde(rename = "NopNganSach")]
    pub nop_ngan_sach: Option<f64>,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Industry", default)]
    pub industry: String,
    #[serde(rename = "Type", default)]
    pub kind: String,
}

/// Per-company financials pulled out of a saved detail page.
///
/// Sequences are kept as raw JSON values since only their length matters
/// downstream; an external extractor may write floats or nulls there.
/// Unknown keys land in `extra` and are carried through to the merged output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(rename = "Ranking", default)]
    pub ranking: Option<i64>,
    #[serde(rename = "CompanyName", default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(rename = "Earnings", default)]
    pub earnings: Vec<Value>,
    #[serde(rename = "TotalProfit", default)]
    pub total_profit: Option<Number>,
    #[serde(rename = "MarketCap", default)]
    pub market_cap: Option<f64>,
    #[serde(rename = "Revenue", default)]
    pub revenue: Vec<Value>,
    #[serde(rename = "TotalRevenue", default)]
    pub total_revenue: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Detail fields that survive the merge. `Earnings` is folded into
/// [`MergedCompany::full_earnings`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedDetails {
    #[serde(rename = "TotalProfit")]
    pub total_profit: Option<Number>,
    #[serde(rename = "MarketCap")]
    pub market_cap: Option<f64>,
    #[serde(rename = "Revenue")]
    pub revenue: Vec<Value>,
    #[serde(rename = "TotalRevenue")]
    pub total_revenue: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A ranked company joined with its details, if any were extracted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedCompany {
    #[serde(flatten)]
    pub company: RankedCompany,
    #[serde(flatten)]
    pub details: Option<MergedDetails>,
    #[serde(rename = "FullEarnings")]
    pub full_earnings: bool,
}
