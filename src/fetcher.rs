use std::fs;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::client::PageClient;
use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::records::RankedCompany;
use crate::resume_manager::ResumeSet;
use crate::store::ArtifactStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchSummary {
    pub fetched: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Downloads each company's detail page into `company_html/`, one at a time.
pub struct Fetcher<'a> {
    client: &'a dyn PageClient,
    config: &'a Config,
    store: &'a ArtifactStore,
}

impl<'a> Fetcher<'a> {
    pub fn new(client: &'a dyn PageClient, config: &'a Config, store: &'a ArtifactStore) -> Self {
        Fetcher { client, config, store }
    }

    /// Companies already in `resume` are skipped. A name is only recorded
    /// after its page is written, and the set is persisted right away.
    pub fn fetch_details(&self, companies: &[RankedCompany], resume: &mut ResumeSet) -> Result<FetchSummary> {
        fs::create_dir_all(self.store.html_dir())?;

        let mut summary = FetchSummary::default();
        let total = companies.len();
        let start = Instant::now();

        for (i, company) in companies.iter().enumerate() {
            let index = i + 1;
            let name = &company.company_name;

            if resume.contains(name) {
                info!("Skipping already fetched company: {}", name);
                summary.skipped += 1;
                continue;
            }

            if company.link.is_empty() {
                warn!("No link for {} ({}/{}). Skipping.", name, index, total);
                summary.skipped += 1;
                continue;
            }

            info!("Fetching {} / {} : {}", index, total, name);
            match self.fetch_one(company, index) {
                Ok(()) => {
                    summary.fetched += 1;
                    if let Err(e) = resume.mark_complete(name) {
                        error!("Failed to persist resume file {:?}: {}", resume.path(), e);
                    }
                }
                Err(ScrapeError::Timeout { .. }) => {
                    warn!("Request for {} timed out. Moving to the next company.", name);
                    summary.failed += 1;
                }
                Err(e) => {
                    warn!("Failed to fetch details for {}: {}", name, e);
                    summary.failed += 1;
                }
            }
        }

        summary.elapsed = start.elapsed();
        info!(
            "Fetching HTML completed in {:.2} seconds: {} fetched, {} skipped, {} failed.",
            summary.elapsed.as_secs_f64(),
            summary.fetched,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    fn fetch_one(&self, company: &RankedCompany, index: usize) -> Result<()> {
        let url = self.config.detail_url(&company.link);
        let body = self.client.get_text(&url, Some(self.config.timeout))?;

        let path = self.store.html_path(index);
        fs::write(&path, body)?;
        info!("HTML for {} saved to {:?}", company.company_name, path);
        Ok(())
    }
}
