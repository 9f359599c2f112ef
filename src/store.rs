use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub const RANKING_FILE: &str = "top_200_companies.json";
pub const FILTERED_FILE: &str = "filtered_companies.json";
pub const FETCHED_FILE: &str = "fetched_companies.json";
pub const HTML_DIR: &str = "company_html";
pub const DETAILS_FILE: &str = "company_details.json";
pub const MERGED_JSON_FILE: &str = "merged_companies.json";
pub const MERGED_CSV_FILE: &str = "merged_companies.csv";
pub const MERGED_XLSX_FILE: &str = "merged_companies.xlsx";

/// Locations of every file the pipeline reads or writes, rooted at one work directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        ArtifactStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ranking_path(&self) -> PathBuf {
        self.root.join(RANKING_FILE)
    }

    pub fn filtered_path(&self) -> PathBuf {
        self.root.join(FILTERED_FILE)
    }

    pub fn fetched_path(&self) -> PathBuf {
        self.root.join(FETCHED_FILE)
    }

    pub fn html_dir(&self) -> PathBuf {
        self.root.join(HTML_DIR)
    }

    /// `company_html/company_<index>.html`, index is 1-based.
    pub fn html_path(&self, index: usize) -> PathBuf {
        self.html_dir().join(format!("company_{}.html", index))
    }

    pub fn details_path(&self) -> PathBuf {
        self.root.join(DETAILS_FILE)
    }

    pub fn merged_json_path(&self) -> PathBuf {
        self.root.join(MERGED_JSON_FILE)
    }

    pub fn merged_csv_path(&self) -> PathBuf {
        self.root.join(MERGED_CSV_FILE)
    }

    pub fn merged_xlsx_path(&self) -> PathBuf {
        self.root.join(MERGED_XLSX_FILE)
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

/// Pretty-printed UTF-8 JSON; non-ASCII text is written as-is.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    debug!("Wrote {:?}", path);
    Ok(())
}
