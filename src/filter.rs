use crate::records::{RankedCompany, RawCompany};

/// Renames API fields to the ranked-company schema. Missing strings become empty.
pub fn project(raw_companies: &[RawCompany]) -> Vec<RankedCompany> {
    raw_companies
        .iter()
        .map(|c| RankedCompany {
            ranking: c.order_number,
            company_name: c.company_name.clone().unwrap_or_default(),
            nop_ngan_sach: c.nop_ngan_sach,
            link: c.link.clone().unwrap_or_default(),
            industry: c.industry.clone().unwrap_or_default(),
            kind: c.kind.clone().unwrap_or_default(),
        })
        .collect()
}
