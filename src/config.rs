//! Engine configuration.
//!
//! Loaded from JSON (missing fields take their defaults), then overridden by
//! environment variables:
//! - `PAPER_RANK_PAGE_SIZE`
//! - `PAPER_RANK_MAX_VECTOR_LEN`

use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    profile::FeedbackParams,
    vectorizer::{DEFAULT_MAX_DF, DEFAULT_MAX_VECTOR_LEN},
};

pub const ENV_PAGE_SIZE: &str = "PAPER_RANK_PAGE_SIZE";
pub const ENV_MAX_VECTOR_LEN: &str = "PAPER_RANK_MAX_VECTOR_LEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// entries kept per paper vector
    pub max_vector_len: usize,
    /// document-frequency ceiling, fraction of the batch
    pub max_df: f64,
    pub like: FeedbackParams,
    pub unlike: FeedbackParams,
    /// papers per result page
    pub page_size: usize,
    /// documents per source request
    pub fetch_page_size: usize,
    /// stop after this many source pages and do not persist ("debug mode")
    pub max_fetch_pages: Option<usize>,
    pub initial_popularity: i64,
    /// compare-and-swap attempts per profile update
    pub max_write_retries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_vector_len: DEFAULT_MAX_VECTOR_LEN,
            max_df: DEFAULT_MAX_DF,
            like: FeedbackParams::LIKE,
            unlike: FeedbackParams::UNLIKE,
            page_size: 20,
            fetch_page_size: 10,
            max_fetch_pages: None,
            initial_popularity: 5,
            max_write_retries: 5,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid config json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config = Self::from_json(&text)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_PAGE_SIZE) {
            self.page_size = parse_positive(ENV_PAGE_SIZE, &v)?;
        }
        if let Some(v) = lookup(ENV_MAX_VECTOR_LEN) {
            self.max_vector_len = parse_positive(ENV_MAX_VECTOR_LEN, &v)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_vector_len == 0 {
            return Err(Error::Config("max_vector_len must be positive".into()));
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(Error::Config(format!("max_df must be in (0, 1], got {}", self.max_df)));
        }
        if self.page_size == 0 || self.fetch_page_size == 0 {
            return Err(Error::Config("page sizes must be positive".into()));
        }
        if self.max_write_retries == 0 {
            return Err(Error::Config("max_write_retries must be positive".into()));
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Config(format!("{key} needs a positive integer, got {value:?}"))),
    }
}
