use log::{error, info};
use serde_json::Value;

use crate::client::PageClient;
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::records::RawCompany;
use crate::store::{read_json, write_json, ArtifactStore};

/// The ranking API response: the raw JSON as received plus the parsed company list.
#[derive(Debug, Clone)]
pub struct RankingPayload {
    pub raw: Value,
    pub companies: Vec<RawCompany>,
}

impl RankingPayload {
    /// Validates the `{Data: {Data: [...]}}` envelope.
    pub fn from_value(raw: Value) -> Result<Self> {
        let items = raw
            .get("Data")
            .and_then(|d| d.get("Data"))
            .ok_or_else(|| ScrapeError::Schema("missing Data.Data".to_string()))?
            .as_array()
            .ok_or_else(|| ScrapeError::Schema("Data.Data is not an array".to_string()))?;

        let companies = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<RawCompany>(item.clone())
                    .map_err(|e| ScrapeError::Schema(format!("company #{}: {}", i + 1, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RankingPayload { raw, companies })
    }
}

/// One GET against the ranking endpoint.
pub fn fetch_ranking(client: &dyn PageClient, config: &Config) -> Result<RankingPayload> {
    let url = config.ranking_url();
    info!("Fetching ranking from {}", url);

    let body = client.get_text(&url, None).map_err(|e| ScrapeError::Network {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    let raw: Value = serde_json::from_str(&body)
        .map_err(|e| ScrapeError::Schema(format!("ranking response is not JSON: {}", e)))?;
    RankingPayload::from_value(raw)
}

/// Uses the cached ranking unless `force_fetch` is set or no cache exists.
pub fn load_or_fetch(client: &dyn PageClient, config: &Config, store: &ArtifactStore) -> Result<RankingPayload> {
    let cache = store.ranking_path();

    if !config.force_fetch && cache.exists() {
        info!("{:?} already exists. Skipping fetch.", cache);
        let raw: Value = read_json(&cache)?;
        return RankingPayload::from_value(raw);
    }

    let payload = match fetch_ranking(client, config) {
        Ok(p) => p,
        Err(e) => {
            error!("An error occurred while fetching ranking data: {}", e);
            return Err(e);
        }
    };
    write_json(&cache, &payload.raw)?;
    info!("Ranking data saved to {:?} ({} companies).", cache, payload.companies.len());
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::{StubClient, StubResponse};
    use serde_json::json;

    fn payload_body() -> String {
        json!({
            "Data": {
                "Data": [
                    {"OrderNumber": 1, "ComapnyName": "Alpha Co", "NopNganSach": 1200.5, "Link": "a.chn", "Industry": "Oil", "Type": "SOE"},
                    {"OrderNumber": 2, "ComapnyName": "Beta Co"}
                ]
            }
        })
        .to_string()
    }

    #[test]
    fn test_fetch_parses_companies() {
        let config = Config::default();
        let client = StubClient::default().with(&config.ranking_url(), StubResponse::Body(payload_body()));

        let payload = fetch_ranking(&client, &config).unwrap();
        assert_eq!(payload.companies.len(), 2);
        assert_eq!(payload.companies[0].company_name.as_deref(), Some("Alpha Co"));
        assert_eq!(payload.companies[1].link, None);
    }

    #[test]
    fn test_bad_status_is_network_error() {
        let config = Config::default();
        let client = StubClient::default().with(&config.ranking_url(), StubResponse::Status(503));

        assert!(matches!(fetch_ranking(&client, &config), Err(ScrapeError::Network { .. })));
    }

    #[test]
    fn test_wrong_shape_is_schema_error() {
        assert!(matches!(
            RankingPayload::from_value(json!({"Data": []})),
            Err(ScrapeError::Schema(_))
        ));
        assert!(matches!(
            RankingPayload::from_value(json!({"Data": {"Data": {}}})),
            Err(ScrapeError::Schema(_))
        ));

        let config = Config::default();
        let client = StubClient::default().with(&config.ranking_url(), StubResponse::Body("<html>".into()));
        assert!(matches!(fetch_ranking(&client, &config), Err(ScrapeError::Schema(_))));
    }

    #[test]
    fn test_cache_bypasses_network() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let config = Config::default();
        std::fs::write(store.ranking_path(), payload_body()).unwrap();

        let client = StubClient::default();
        let payload = load_or_fetch(&client, &config, &store).unwrap();
        assert_eq!(payload.companies.len(), 2);
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_force_fetch_refreshes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let config = Config::default().with_force_fetch(true);
        std::fs::write(store.ranking_path(), json!({"Data": {"Data": []}}).to_string()).unwrap();

        let client = StubClient::default().with(&config.ranking_url(), StubResponse::Body(payload_body()));
        let payload = load_or_fetch(&client, &config, &store).unwrap();
        assert_eq!(payload.companies.len(), 2);
        assert_eq!(client.call_count(), 1);

        let cached: Value = read_json(&store.ranking_path()).unwrap();
        assert_eq!(cached["Data"]["Data"].as_array().unwrap().len(), 2);
    }
}
