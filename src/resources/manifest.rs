//! Resource manifest document and the batch configuration built from it

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Tool-specific parameters, opaque to the runtime
pub type Parameters = serde_json::Map<String, Value>;

/// One resource declared by the manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceSpec {
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    pub extract: bool,
}

impl ResourceSpec {
    /// File name the download is stored under
    ///
    /// Explicit filename, else the URL's last path segment, else the
    /// resource name. Directory components are stripped so a resource can
    /// never be written outside the resources directory.
    pub fn destination_name(&self) -> String {
        let candidate = self
            .filename
            .as_deref()
            .filter(|f| !f.is_empty())
            .or_else(|| crate::transport::location::last_path_segment(&self.url))
            .unwrap_or(self.name.as_str());

        Path::new(candidate)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "resource".to_string())
    }

    /// Label used in logs and errors
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ManifestDoc {
    #[serde(default)]
    tool: Option<Value>,
    #[serde(default)]
    tool_version: Option<Value>,
    #[serde(default)]
    parameters: Option<Parameters>,
    #[serde(default)]
    resources: Option<Vec<ResourceSpec>>,
}

/// Everything a collaborator needs to know about its batch besides the targets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchConfig {
    pub tool: String,
    pub tool_version: String,
    pub parameters: Parameters,
    pub resources: Vec<ResourceSpec>,
    pub resources_dir: Option<PathBuf>,
}

impl BatchConfig {
    /// Build from a manifest document; `null` is an empty manifest
    pub fn from_manifest(doc: &Value) -> Result<Self, serde_json::Error> {
        let doc: ManifestDoc = if doc.is_null() {
            ManifestDoc::default()
        } else {
            ManifestDoc::deserialize(doc)?
        };

        Ok(Self {
            tool: doc.tool.as_ref().map(scalar_text).unwrap_or_default(),
            tool_version: doc.tool_version.as_ref().map(scalar_text).unwrap_or_default(),
            parameters: doc.parameters.unwrap_or_default(),
            resources: doc.resources.unwrap_or_default(),
            resources_dir: None,
        })
    }

    /// Fill tool identity the manifest left out
    pub fn apply_identity_defaults(&mut self, tool: &str, tool_version: &str) {
        if self.tool.is_empty() {
            self.tool = tool.to_string();
        }
        if self.tool_version.is_empty() {
            self.tool_version = tool_version.to_string();
        }
    }

    pub fn set_resources_dir(&mut self, dir: PathBuf) {
        self.resources_dir = Some(dir);
    }

    /// String parameter lookup
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }
}

// "1.3.2" and 1.3 both mean a version string
fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => crate::config::settings::is_truthy(&s),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_manifest_is_empty_config() {
        let cfg = BatchConfig::from_manifest(&Value::Null).unwrap();
        assert_eq!(cfg, BatchConfig::default());
    }

    #[test]
    fn test_full_manifest() {
        let cfg = BatchConfig::from_manifest(&json!({
            "tool": "masscan",
            "tool_version": 1.3,
            "parameters": {"rate": 1000, "ports": "80,443"},
            "resources": [
                {"name": "words", "url": "https://cdn/words.txt", "sha256": "ab"},
                {"name": "db", "url": "https://cdn/db.tgz?sig=1", "filename": "geo.tgz", "extract": "yes"}
            ]
        }))
        .unwrap();

        assert_eq!(cfg.tool, "masscan");
        assert_eq!(cfg.tool_version, "1.3");
        assert_eq!(cfg.parameters["rate"], 1000);
        assert_eq!(cfg.parameter_str("ports"), Some("80,443"));
        assert_eq!(cfg.resources.len(), 2);
        assert!(!cfg.resources[0].extract);
        assert!(cfg.resources[1].extract);
        assert_eq!(cfg.resources[1].destination_name(), "geo.tgz");
    }

    #[test]
    fn test_malformed_manifest_is_error() {
        assert!(BatchConfig::from_manifest(&json!({"resources": "nope"})).is_err());
        assert!(BatchConfig::from_manifest(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_identity_defaults_only_fill_gaps() {
        let mut cfg = BatchConfig::from_manifest(&json!({"tool": "httpx"})).unwrap();
        cfg.apply_identity_defaults("fallback", "0.1.0");
        assert_eq!(cfg.tool, "httpx");
        assert_eq!(cfg.tool_version, "0.1.0");
    }

    #[test]
    fn test_destination_name_fallbacks() {
        let spec = |url: &str, filename: Option<&str>| ResourceSpec {
            name: "wordlist".to_string(),
            url: url.to_string(),
            sha256: None,
            filename: filename.map(str::to_string),
            extract: false,
        };
        assert_eq!(spec("https://cdn/a/list.txt?x=1", None).destination_name(), "list.txt");
        assert_eq!(spec("https://cdn/a/", None).destination_name(), "wordlist");
        assert_eq!(spec("https://cdn/a/list.txt", Some("custom.txt")).destination_name(), "custom.txt");
        assert_eq!(spec("https://cdn/a/list.txt", Some("../../etc/passwd")).destination_name(), "passwd");
    }
}
