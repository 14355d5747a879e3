use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calc::premium::PremiumRates;
use crate::core::record_builder::{RecordBuilder, TitleStrategy};
use crate::core::synonyms::SynonymTable;
use crate::error::ConfigError;

/// Environment variable naming a config file for the runner.
pub const CONFIG_ENV: &str = "NOTICE_PARSER_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads for a batch; 0 uses rayon's global pool.
    pub max_parallel: usize,
    /// File extensions (without dot, lower case) treated as XML documents.
    pub extensions: Vec<String>,
    /// Files at least this large are read through a memory map.
    pub mmap_threshold_bytes: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_parallel: 0,
            extensions: vec!["xml".to_string()],
            mmap_threshold_bytes: 10 * 1024 * 1024,
        }
    }
}

impl BatchConfig {
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .map_or(false, |ext| self.extensions.iter().any(|e| *e == ext))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub synonyms: SynonymTable,
    pub title_strategy: TitleStrategy,
    pub rates: PremiumRates,
    pub batch: BatchConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// `explicit`, else the file named by `NOTICE_PARSER_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn record_builder(&self) -> Result<RecordBuilder, ConfigError> {
        Ok(RecordBuilder::new(self.synonyms.compile()?, self.title_strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{"title_strategy": "header_label", "rates": {"health": 10.0}, "batch": {"max_parallel": 2}}"#,
        )
        .unwrap();
        assert_eq!(cfg.title_strategy, TitleStrategy::HeaderLabel);
        assert_eq!(cfg.rates.health, 10.0);
        assert_eq!(cfg.rates.care_age_min, 40);
        assert_eq!(cfg.batch.max_parallel, 2);
        assert_eq!(cfg.batch.extensions, ["xml"]);
        assert_eq!(cfg.synonyms, SynonymTable::default());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let batch = BatchConfig::default();
        assert!(batch.accepts(Path::new("a/b/NOTICE.XML")));
        assert!(!batch.accepts(Path::new("a/b/readme.txt")));
        assert!(!batch.accepts(Path::new("noext")));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load(Path::new("/nonexistent/notice-parser.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
