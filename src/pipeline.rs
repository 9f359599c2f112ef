use log::{error, info};

use crate::client::PageClient;
use crate::config::{Config, ExtractorKind};
use crate::error::Result;
use crate::extractor::{DetailExtractor, HtmlExtractor, ScriptExtractor};
use crate::fetcher::{FetchSummary, Fetcher};
use crate::exporter;
use crate::filter;
use crate::lister;
use crate::merger;
use crate::records::{MergedCompany, RankedCompany};
use crate::resume_manager::ResumeSet;
use crate::store::{write_json, ArtifactStore};

/// What a completed run produced.
#[derive(Debug)]
pub struct RunReport {
    pub fetch: FetchSummary,
    pub merged: Vec<MergedCompany>,
    pub export_failures: usize,
}

/// Runs list → filter → fetch → extract → merge → export against one work directory.
pub struct Pipeline<'a> {
    config: &'a Config,
    client: &'a dyn PageClient,
    store: ArtifactStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, client: &'a dyn PageClient) -> Self {
        Pipeline { config, client, store: ArtifactStore::new(config.work_dir.clone()) }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Extractor chosen by configuration.
    pub fn default_extractor(&self, filtered: &[RankedCompany]) -> Box<dyn DetailExtractor> {
        match &self.config.extractor {
            ExtractorKind::Native => Box::new(HtmlExtractor::new(filtered.to_vec())),
            ExtractorKind::Script(command) => Box::new(ScriptExtractor::new(
                command.clone(),
                self.store.root().to_path_buf(),
                self.store.details_path(),
            )),
        }
    }

    pub fn run(&self) -> Result<RunReport> {
        self.run_with(|filtered| self.default_extractor(filtered))
    }

    /// Same as [`Pipeline::run`] with the extractor built by `make_extractor`.
    pub fn run_with<F>(&self, make_extractor: F) -> Result<RunReport>
    where
        F: FnOnce(&[RankedCompany]) -> Box<dyn DetailExtractor>,
    {
        let payload = lister::load_or_fetch(self.client, self.config, &self.store)?;

        let filtered = filter::project(&payload.companies);
        write_json(&self.store.filtered_path(), &filtered)?;
        info!("Filtered data has been saved to {:?}.", self.store.filtered_path());

        let mut resume = ResumeSet::load(self.store.fetched_path());
        let fetch = Fetcher::new(self.client, self.config, &self.store).fetch_details(&filtered, &mut resume)?;

        let extractor = make_extractor(filtered.as_slice());
        let details = match extractor.extract(&self.store.html_dir()) {
            Ok(d) => d,
            Err(e) => {
                error!("An error occurred while extracting company details: {}", e);
                return Err(e);
            }
        };
        write_json(&self.store.details_path(), &details)?;
        info!("Company details saved to {:?}.", self.store.details_path());

        let merged = match merger::merge_and_save(&self.store, &filtered, details) {
            Ok(m) => m,
            Err(e) => {
                error!("An error occurred while merging JSON files: {}", e);
                return Err(e);
            }
        };

        let failures = exporter::export(&merged, &self.store.merged_csv_path(), &self.store.merged_xlsx_path());

        Ok(RunReport { fetch, merged, export_failures: failures.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::stub::{StubClient, StubResponse};
    use crate::error::ScrapeError;
    use crate::records::DetailRecord;
    use serde_json::{json, Value};
    use std::path::Path;

    struct StubExtractor(Vec<DetailRecord>);

    impl DetailExtractor for StubExtractor {
        fn extract(&self, _html_dir: &Path) -> Result<Vec<DetailRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;

    impl DetailExtractor for FailingExtractor {
        fn extract(&self, _html_dir: &Path) -> Result<Vec<DetailRecord>> {
            Err(ScrapeError::Subprocess("exit status: 1".to_string()))
        }
    }

    fn stub(details: Vec<DetailRecord>) -> Box<dyn DetailExtractor> {
        Box::new(StubExtractor(details))
    }

    fn two_company_setup() -> (tempfile::TempDir, Config, StubClient) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { work_dir: dir.path().to_path_buf(), ..Config::default() };
        let ranking = json!({
            "Data": {"Data": [
                {"OrderNumber": 1, "ComapnyName": "Alpha Co", "NopNganSach": 500.0, "Link": "alpha.chn", "Industry": "Oil", "Type": "SOE"},
                {"OrderNumber": 2, "ComapnyName": "Beta Co", "NopNganSach": 300.0, "Link": "beta.chn", "Industry": "Bank", "Type": "JSC"}
            ]}
        });
        let client = StubClient::default()
            .with(&config.ranking_url(), StubResponse::Body(ranking.to_string()))
            .with(&config.detail_url("alpha.chn"), StubResponse::Body("<html>a</html>".into()))
            .with(&config.detail_url("beta.chn"), StubResponse::Body("<html>b</html>".into()));
        (dir, config, client)
    }

    #[test]
    fn test_end_to_end_two_companies() {
        let (_dir, config, client) = two_company_setup();
        let details: Vec<DetailRecord> = serde_json::from_value(json!([
            {"Ranking": 1, "CompanyName": "Alpha Co", "Earnings": [1, 2, 3, 4], "TotalProfit": 10, "MarketCap": 99.5, "Revenue": [5, 6], "TotalRevenue": 11}
        ]))
        .unwrap();

        let pipeline = Pipeline::new(&config, &client);
        let report = pipeline.run_with(|_| stub(details)).unwrap();
        assert_eq!(report.fetch.fetched, 2);
        assert_eq!(report.export_failures, 0);

        let store = pipeline.store();
        let merged: Vec<Value> = crate::store::read_json(&store.merged_json_path()).unwrap();
        assert_eq!(merged.len(), 2);

        assert_eq!(merged[0]["CompanyName"], "Alpha Co");
        assert_eq!(merged[0]["FullEarnings"], true);
        assert_eq!(merged[0]["TotalProfit"], 10);
        assert_eq!(merged[0]["MarketCap"], 99.5);
        assert!(merged[0].get("Earnings").is_none());

        assert_eq!(merged[1]["CompanyName"], "Beta Co");
        assert_eq!(merged[1]["FullEarnings"], false);
        assert!(merged[1].get("TotalProfit").is_none());
        assert!(merged[1].get("Revenue").is_none());

        assert!(store.filtered_path().exists());
        assert!(store.details_path().exists());
        assert!(store.merged_csv_path().exists());
        assert!(store.merged_xlsx_path().exists());
    }

    #[test]
    fn test_rerun_uses_caches() {
        let (_dir, config, client) = two_company_setup();
        Pipeline::new(&config, &client)
            .run_with(|_| stub(vec![]))
            .unwrap();
        assert_eq!(client.call_count(), 3);

        let offline = StubClient::default();
        let report = Pipeline::new(&config, &offline)
            .run_with(|_| stub(vec![]))
            .unwrap();
        assert_eq!(offline.call_count(), 0);
        assert_eq!(report.fetch.skipped, 2);
        assert_eq!(report.merged.len(), 2);
    }

    #[test]
    fn test_extractor_failure_skips_merge() {
        let (_dir, config, client) = two_company_setup();
        let pipeline = Pipeline::new(&config, &client);

        let result = pipeline.run_with(|_| -> Box<dyn DetailExtractor> { Box::new(FailingExtractor) });
        assert!(matches!(result, Err(ScrapeError::Subprocess(_))));
        assert!(!pipeline.store().merged_json_path().exists());
        assert!(!pipeline.store().merged_csv_path().exists());
    }

    #[test]
    fn test_ranking_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { work_dir: dir.path().to_path_buf(), ..Config::default() };
        let client = StubClient::default();

        let result = Pipeline::new(&config, &client).run();
        assert!(matches!(result, Err(ScrapeError::Network { .. })));
        assert!(!dir.path().join("filtered_companies.json").exists());
    }

    #[test]
    fn test_native_extractor_end_to_end() {
        let (_dir, config, _) = two_company_setup();
        let page = r#"<html><body><table>
            <tr><td>Lợi nhuận sau thuế của công ty mẹ</td><td>1</td><td>2</td><td>3</td><td>4</td></tr>
            </table></body></html>"#;
        let ranking = json!({"Data": {"Data": [
            {"OrderNumber": 1, "ComapnyName": "Alpha Co", "Link": "alpha.chn"}
        ]}});
        let client = StubClient::default()
            .with(&config.ranking_url(), StubResponse::Body(ranking.to_string()))
            .with(&config.detail_url("alpha.chn"), StubResponse::Body(page.to_string()));

        let report = Pipeline::new(&config, &client).run().unwrap();
        assert!(report.merged[0].full_earnings);
        assert_eq!(report.merged[0].details.as_ref().unwrap().total_profit, Some(serde_json::Number::from(10i64)));
    }
}
