use std::collections::HashMap;

use log::{info, warn};
use serde_json::Value;

use crate::error::{Result, ScrapeError};
use crate::records::{DetailRecord, MergedCompany, MergedDetails, RankedCompany};
use crate::store::{write_json, ArtifactStore};

/// Number of yearly earnings figures a complete detail page carries.
pub const FULL_EARNINGS_LEN: usize = 4;

/// Joins ranked companies with their details by `Ranking`, keeping the ranked order.
///
/// Duplicate rankings among `details` resolve last-write-wins. Companies
/// without a match keep only their ranked fields.
pub fn merge(filtered: &[RankedCompany], details: Vec<DetailRecord>) -> Vec<MergedCompany> {
    let mut by_rank: HashMap<i64, DetailRecord> = HashMap::new();
    for detail in details {
        match detail.ranking {
            Some(rank) => {
                by_rank.insert(rank, detail);
            }
            None => warn!("Ignoring detail record without a Ranking"),
        }
    }

    filtered
        .iter()
        .map(|company| {
            let detail = company.ranking.and_then(|r| by_rank.get(&r));
            match detail {
                Some(detail) => overlay(company, detail.clone()),
                None => MergedCompany { company: company.clone(), details: None, full_earnings: false },
            }
        })
        .collect()
}

/// Detail fields win over ranked fields that share a key.
fn overlay(company: &RankedCompany, detail: DetailRecord) -> MergedCompany {
    let mut company = company.clone();
    let mut extra = detail.extra;

    if let Some(name) = detail.company_name {
        company.company_name = name;
    }
    if let Some(Value::Number(n)) = extra.remove("NopNganSach") {
        company.nop_ngan_sach = n.as_f64();
    }
    for (key, field) in [
        ("Link", &mut company.link),
        ("Industry", &mut company.industry),
        ("Type", &mut company.kind),
    ] {
        if let Some(Value::String(s)) = extra.remove(key) {
            *field = s;
        }
    }
    extra.remove("FullEarnings");

    MergedCompany {
        company,
        full_earnings: detail.earnings.len() == FULL_EARNINGS_LEN,
        details: Some(MergedDetails {
            total_profit: detail.total_profit,
            market_cap: detail.market_cap,
            revenue: detail.revenue,
            total_revenue: detail.total_revenue,
            extra,
        }),
    }
}

/// Merges and writes `merged_companies.json`. Any failure here aborts the export.
pub fn merge_and_save(
    store: &ArtifactStore,
    filtered: &[RankedCompany],
    details: Vec<DetailRecord>,
) -> Result<Vec<MergedCompany>> {
    let merged = merge(filtered, details);
    let path = store.merged_json_path();
    write_json(&path, &merged).map_err(|e| ScrapeError::Merge(format!("writing {:?}: {}", path, e)))?;
    info!("Merged data has been saved to {:?} ({} companies).", path, merged.len());
    Ok(merged)
}
