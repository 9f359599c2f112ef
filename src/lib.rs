pub mod client;
pub mod config;
pub mod error;
pub mod exporter;
pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod lister;
pub mod logger;
pub mod merger;
pub mod pipeline;
pub mod records;
pub mod resume_manager;
pub mod store;

// Exporting types for convenience
pub use client::{HttpClient, PageClient};
pub use config::Config;
pub use error::ScrapeError;
pub use extractor::{DetailExtractor, HtmlExtractor, ScriptExtractor};
pub use pipeline::{Pipeline, RunReport};
pub use records::{DetailRecord, MergedCompany, RankedCompany, RawCompany};
pub use resume_manager::ResumeSet;
