//! Optional TOML settings file
//!
//! Local runs can keep their setting values in a TOML table instead of the
//! environment. Keys are either the environment names (`INPUTS_URL`) or
//! their kebab-case forms (`inputs-url`). The environment always wins.

use super::error::{ConfigError, ConfigResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_FILE_NAME: &str = "adapter-runtime.toml";

/// Setting values loaded from a TOML file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsFile {
    values: HashMap<String, String>,
}

impl SettingsFile {
    /// Load the file named on the command line, or the default one if it exists
    ///
    /// A file that was explicitly named must exist.
    pub fn discover(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::file(path, "does not exist"));
                }
                Self::load(path)
            }
            None => match default_path() {
                Some(path) if path.exists() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load and flatten a settings file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::file(path, e))?;
        Self::parse(&contents).map_err(|e| ConfigError::file(path, e))
    }

    /// Parse settings from TOML text
    pub fn parse(contents: &str) -> Result<Self, String> {
        let table = contents
            .parse::<toml::Table>()
            .map_err(|e| e.to_string())?;

        let mut values = HashMap::new();
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(format!(
                        "setting '{}' must be a string, integer or boolean, found {}",
                        key,
                        other.type_str()
                    ))
                }
            };
            values.insert(normalise_key(&key), text);
        }

        Ok(Self { values })
    }

    /// Look up a setting by its environment name
    pub fn get(&self, name: &str) -> Option<String> {
        self.values.get(&normalise_key(name)).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn normalise_key(key: &str) -> String {
    key.trim().to_ascii_uppercase().replace('-', "_")
}

fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("adapter-runtime").join(DEFAULT_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_both_key_styles() {
        let file = SettingsFile::parse(
            r#"
INPUTS_URL = "file:///tmp/inputs.txt"
run-id = "local-run"
heartbeat-seconds = 15
adapter-preserve-workdir = true
"#,
        )
        .unwrap();

        assert_eq!(file.get("INPUTS_URL").as_deref(), Some("file:///tmp/inputs.txt"));
        assert_eq!(file.get("RUN_ID").as_deref(), Some("local-run"));
        assert_eq!(file.get("HEARTBEAT_SECONDS").as_deref(), Some("15"));
        assert_eq!(file.get("ADAPTER_PRESERVE_WORKDIR").as_deref(), Some("true"));
        assert_eq!(file.get("SIGNAL_URL"), None);
    }

    #[test]
    fn test_parse_rejects_tables() {
        let err = SettingsFile::parse("[resources]\nname = \"x\"\n").unwrap_err();
        assert!(err.contains("resources"), "got: {}", err);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = SettingsFile::discover(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::File { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "batch-id = \"b7\"\n").unwrap();

        let file = SettingsFile::discover(Some(&path)).unwrap();
        assert_eq!(file.get("BATCH_ID").as_deref(), Some("b7"));
    }
}
