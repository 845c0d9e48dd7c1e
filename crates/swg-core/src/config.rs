use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Project configuration loaded from `.swg.yaml`, and the payload of the
/// sidecar settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwgConfig {
    /// Filesystem paths or `http(s)` URLs.
    pub sources: Vec<String>,
    pub target: Option<String>,
    pub languages: TargetLanguages,
    pub namespace: String,
    pub http_timeout_seconds: u64,
    pub allow_override: bool,
    pub save_settings: bool,
    /// Overrides the `<scheme>://<host><basePath>` URL of every wrapper.
    pub base_url: Option<String>,
}

impl Default for SwgConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            target: None,
            languages: TargetLanguages::ALL,
            namespace: "swg".to_string(),
            http_timeout_seconds: 30,
            allow_override: false,
            save_settings: false,
            base_url: None,
        }
    }
}

impl SwgConfig {
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            namespace: self.namespace.clone(),
            http_timeout_seconds: self.http_timeout_seconds,
            base_url: self.base_url.clone(),
        }
    }
}

/// The slice of configuration the emitters read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub namespace: String,
    pub http_timeout_seconds: u64,
    pub base_url: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        SwgConfig::default().emit_options()
    }
}

/// One output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLanguage {
    /// Class-based output.
    Csharp,
    /// Interface-based output.
    Typescript,
}

impl TargetLanguage {
    pub fn bit(&self) -> u8 {
        match self {
            TargetLanguage::Csharp => TargetLanguages::CLASS_BASED.0,
            TargetLanguage::Typescript => TargetLanguages::INTERFACE_BASED.0,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TargetLanguage::Csharp => "cs",
            TargetLanguage::Typescript => "ts",
        }
    }
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TargetLanguage::Csharp => "csharp",
            TargetLanguage::Typescript => "typescript",
        })
    }
}

/// Bitmask of target languages, written in YAML as a list of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TargetLanguage>", into = "Vec<TargetLanguage>")]
pub struct TargetLanguages(u8);

impl TargetLanguages {
    pub const NONE: TargetLanguages = TargetLanguages(0);
    pub const CLASS_BASED: TargetLanguages = TargetLanguages(1);
    pub const INTERFACE_BASED: TargetLanguages = TargetLanguages(2);
    pub const ALL: TargetLanguages = TargetLanguages(3);

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, language: TargetLanguage) -> bool {
        self.0 & language.bit() != 0
    }

    pub fn insert(&mut self, language: TargetLanguage) {
        self.0 |= language.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 & Self::ALL.0 == 0
    }

    /// Selected languages, class-based first.
    pub fn iter(&self) -> impl Iterator<Item = TargetLanguage> + '_ {
        [TargetLanguage::Csharp, TargetLanguage::Typescript]
            .into_iter()
            .filter(|l| self.contains(*l))
    }
}

impl From<Vec<TargetLanguage>> for TargetLanguages {
    fn from(languages: Vec<TargetLanguage>) -> Self {
        let mut set = TargetLanguages::NONE;
        for language in languages {
            set.insert(language);
        }
        set
    }
}

impl From<TargetLanguages> for Vec<TargetLanguage> {
    fn from(set: TargetLanguages) -> Self {
        set.iter().collect()
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".swg.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<SwgConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: SwgConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# swg configuration
sources:
  - swagger.json
  # - https://petstore.swagger.io/v2/swagger.json
target: generated/Client
languages: [csharp, typescript]   # csharp | typescript
namespace: swg
http_timeout_seconds: 30
allow_override: false
save_settings: false
# base_url: https://api.example.com
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SwgConfig::default();
        assert!(config.sources.is_empty());
        assert_eq!(config.namespace, "swg");
        assert_eq!(config.http_timeout_seconds, 30);
        assert_eq!(config.languages, TargetLanguages::ALL);
        assert!(!config.allow_override);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
sources: [a.json, "https://example.com/b.json"]
target: out/Api
languages: [typescript]
namespace: Acme
http_timeout_seconds: 5
allow_override: true
save_settings: true
base_url: https://api.example.com
"#;
        let config: SwgConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.target.as_deref(), Some("out/Api"));
        assert_eq!(config.languages, TargetLanguages::INTERFACE_BASED);
        assert!(!config.languages.contains(TargetLanguage::Csharp));
        assert_eq!(config.namespace, "Acme");
        assert_eq!(config.http_timeout_seconds, 5);
        assert!(config.allow_override && config.save_settings);
        assert_eq!(config.emit_options().base_url.as_deref(), Some("https://api.example.com"));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: SwgConfig = serde_yaml_ng::from_str("sources: [api.json]\n").unwrap();
        assert_eq!(config.sources, vec!["api.json"]);
        assert_eq!(config.languages, TargetLanguages::ALL);
        assert_eq!(config.namespace, "swg");
    }

    #[test]
    fn test_default_content_parses() {
        let config: SwgConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.sources, vec!["swagger.json"]);
        assert_eq!(config.languages.bits(), 3);
    }

    #[test]
    fn test_languages_serialize_as_names() {
        let json = serde_json::to_string(&TargetLanguages::ALL).unwrap();
        assert_eq!(json, r#"["csharp","typescript"]"#);
        let empty: TargetLanguages = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
    }
}
