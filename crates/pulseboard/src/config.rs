//! Pipeline configuration and the persisted API credential.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PulseboardError, Result};
use crate::input::ParserConfig;
use crate::kpi::DEFAULT_MAX_KPIS;
use crate::transform::MAX_CHART_POINTS;

/// Bounds on the number of sample rows sent to the insight collaborator.
pub const AI_SAMPLE_ROWS_MIN: usize = 5;
pub const AI_SAMPLE_ROWS_MAX: usize = 10;

/// Key under which the credential is stored.
pub const CREDENTIAL_KEY: &str = "api_key";

/// Configuration for a Pulseboard session.
#[derive(Debug, Clone)]
pub struct PulseboardConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Upper bound on chart points.
    pub max_chart_points: usize,
    /// Maximum KPIs derived per dataset.
    pub max_kpis: usize,
    /// Sample rows included in insight prompts.
    ai_sample_rows: usize,
}

impl PulseboardConfig {
    pub fn ai_sample_rows(&self) -> usize {
        self.ai_sample_rows
    }

    /// Set the prompt sample size, clamped to 5..=10.
    pub fn with_ai_sample_rows(mut self, rows: usize) -> Self {
        self.ai_sample_rows = rows.clamp(AI_SAMPLE_ROWS_MIN, AI_SAMPLE_ROWS_MAX);
        self
    }
}

impl Default for PulseboardConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            max_chart_points: MAX_CHART_POINTS,
            max_kpis: DEFAULT_MAX_KPIS,
            ai_sample_rows: AI_SAMPLE_ROWS_MIN,
        }
    }
}

/// Storage for the single API credential.
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored credential. `None` clears it.
    fn save(&self, credential: Option<&str>) -> Result<()>;
}

/// Credential kept in a JSON key-value file.
///
/// Other keys in the file are preserved on every write.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$PULSEBOARD_HOME/credentials.json`, falling back to
    /// `$HOME/.pulseboard/credentials.json`.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(dir) = std::env::var_os("PULSEBOARD_HOME") {
            return Some(PathBuf::from(dir).join("credentials.json"));
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".pulseboard").join("credentials.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(PulseboardError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        let value: Value = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            PulseboardError::Config(format!(
                "Failed to parse credential file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        match value {
            Value::Object(map) => Ok(map),
            _ => Err(PulseboardError::Config(format!(
                "Credential file '{}' is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| PulseboardError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(&self.path).map_err(|e| PulseboardError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), entries)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(CREDENTIAL_KEY)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }

    fn save(&self, credential: Option<&str>) -> Result<()> {
        let mut entries = self.read_entries()?;
        match credential {
            Some(key) => {
                entries.insert(CREDENTIAL_KEY.to_string(), Value::String(key.to_string()));
            }
            None => {
                entries.remove(CREDENTIAL_KEY);
            }
        }
        self.write_entries(&entries)?;
        debug!(path = %self.path.display(), stored = credential.is_some(), "updated credential file");
        Ok(())
    }
}

/// Credential held in memory for the lifetime of the store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new(credential: Option<String>) -> Self {
        Self {
            credential: Mutex::new(credential),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .credential
            .lock()
            .map_err(|_| PulseboardError::Config("credential store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, credential: Option<&str>) -> Result<()> {
        let mut guard = self
            .credential
            .lock()
            .map_err(|_| PulseboardError::Config("credential store lock poisoned".to_string()))?;
        *guard = credential.map(str::to_string);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sample_rows_are_clamped() {
        assert_eq!(PulseboardConfig::default().ai_sample_rows(), 5);
        assert_eq!(PulseboardConfig::default().with_ai_sample_rows(2).ai_sample_rows(), 5);
        assert_eq!(PulseboardConfig::default().with_ai_sample_rows(8).ai_sample_rows(), 8);
        assert_eq!(PulseboardConfig::default().with_ai_sample_rows(50).ai_sample_rows(), 10);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested").join("creds.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save(Some("sk-test")).unwrap();
        assert_eq!(store.load().unwrap(), Some("sk-test".to_string()));

        // A fresh store over the same file sees the persisted value
        let reopened = FileCredentialStore::new(store.path());
        assert_eq!(reopened.load().unwrap(), Some("sk-test".to_string()));

        store.save(None).unwrap();
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        store.save(Some("k")).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[CREDENTIAL_KEY], "k");
    }

    #[test]
    fn test_file_store_rejects_non_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("creds.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = FileCredentialStore::new(&path).load().unwrap_err();
        assert!(matches!(err, PulseboardError::Config(_)));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::default();
        assert_eq!(store.load().unwrap(), None);
        store.save(Some("abc")).unwrap();
        assert_eq!(store.load().unwrap(), Some("abc".to_string()));
    }
}
