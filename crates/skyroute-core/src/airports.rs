//! Read-only airport dictionary keyed by ICAO code.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::AirportDetail;

const BUNDLED_AIRPORTS: &str = include_str!("../data/airports.json");

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read airport directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("airport directory is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AirportInfo {
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    entries: HashMap<String, AirportInfo>,
}

impl AirportDirectory {
    /// Directory compiled into the binary.
    pub fn bundled() -> Self {
        Self::from_json_str(BUNDLED_AIRPORTS).unwrap_or_else(|error| {
            warn!(%error, "bundled airport directory is invalid; starting empty");
            Self::default()
        })
    }

    /// Parses `{"<code>": {"name": .., "city": .., "country": ..}, ...}`.
    pub fn from_json_str(raw: &str) -> Result<Self, DirectoryError> {
        let parsed: HashMap<String, AirportInfo> = serde_json::from_str(raw)?;
        let entries = parsed
            .into_iter()
            .map(|(code, info)| (code.trim().to_ascii_uppercase(), info))
            .collect();
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Loads `path` when given, otherwise the bundled dataset.
    pub fn load_or_bundled(path: Option<&Path>) -> Result<Self, DirectoryError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::bundled()),
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&AirportInfo> {
        self.entries.get(&code.trim().to_ascii_uppercase())
    }

    /// Detail for `code`; unknown codes yield a bare detail carrying only the code.
    pub fn detail(&self, code: &str) -> AirportDetail {
        let mut detail = AirportDetail::bare(code.trim().to_ascii_uppercase());
        if let Some(info) = self.lookup(code) {
            detail.name = info.name.clone();
            detail.city = info.city.clone();
            detail.country = info.country.clone();
        }
        detail
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
