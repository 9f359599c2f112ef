use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::error::Result;
use crate::store::write_json;

/// Names of companies whose detail page is already on disk.
///
/// Stored as a plain JSON array of strings so a restarted run skips them.
#[derive(Debug, Clone, Default)]
pub struct ResumeSet {
    path: PathBuf,
    fetched: BTreeSet<String>,
}

impl ResumeSet {
    /// Loads the set from `path`. A missing or unreadable file starts a fresh set.
    pub fn load<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        if !path.exists() {
            info!("No resume file found at {:?}. Starting fresh.", path);
            return ResumeSet { path, fetched: BTreeSet::new() };
        }

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to read resume file {:?}: {}. Starting fresh.", path, e);
                return ResumeSet { path, fetched: BTreeSet::new() };
            }
        };

        match serde_json::from_str::<Vec<String>>(&content) {
            Ok(names) => {
                let fetched: BTreeSet<String> = names.into_iter().collect();
                info!("Resumed previous session: {} companies already fetched.", fetched.len());
                ResumeSet { path, fetched }
            }
            Err(e) => {
                error!("Failed to parse resume file {:?}: {}. Starting fresh.", path, e);
                ResumeSet { path, fetched: BTreeSet::new() }
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fetched.contains(name)
    }

    pub fn len(&self) -> usize {
        self.fetched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetched.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records `name` and rewrites the whole set on disk.
    pub fn mark_complete(&mut self, name: &str) -> Result<()> {
        self.fetched.insert(name.to_string());
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        let names: Vec<&String> = self.fetched.iter().collect();
        write_json(&self.path, &names)
    }
}
