use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use swg_core::config::SwgConfig;
use thiserror::Error;

pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

const SIDECAR_SUFFIX: &str = ".swg.json";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse settings {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid generator version `{0}`")]
    InvalidVersion(String),

    #[error("settings were written by swg {found}, which is newer than this swg {running}")]
    IncompatibleSettings { found: String, running: String },
}

/// The sidecar document saved next to generated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub generator_version: String,
    pub config: SwgConfig,
}

/// `<target>.swg.json`.
pub fn sidecar_path(target: &Path) -> PathBuf {
    let mut path = target.as_os_str().to_owned();
    path.push(SIDECAR_SUFFIX);
    PathBuf::from(path)
}

pub fn save(path: &Path, config: &SwgConfig) -> Result<(), SettingsError> {
    let settings = Settings {
        generator_version: GENERATOR_VERSION.to_string(),
        config: config.clone(),
    };
    let json = serde_json::to_string_pretty(&settings).map_err(|source| SettingsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json + "\n").map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a sidecar, refusing one written by a newer generator.
pub fn load(path: &Path) -> Result<SwgConfig, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings =
        serde_json::from_str(&content).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    check_compatible(&settings.generator_version, GENERATOR_VERSION)?;
    Ok(settings.config)
}

fn major_minor(version: &str) -> Result<(u64, u64), SettingsError> {
    let invalid = || SettingsError::InvalidVersion(version.to_string());
    let mut parts = version.trim().split('.');
    let major = parts.next().ok_or_else(invalid)?.parse().map_err(|_| invalid())?;
    let minor = match parts.next() {
        Some(minor) => minor.parse().map_err(|_| invalid())?,
        None => 0,
    };
    Ok((major, minor))
}

/// Patch releases never block each other; only a newer major.minor does.
pub fn check_compatible(found: &str, running: &str) -> Result<(), SettingsError> {
    if major_minor(found)? > major_minor(running)? {
        return Err(SettingsError::IncompatibleSettings {
            found: found.to_string(),
            running: running.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swg_core::config::TargetLanguages;

    #[test]
    fn test_sidecar_path_appends_suffix() {
        assert_eq!(
            sidecar_path(Path::new("out/Petstore")),
            PathBuf::from("out/Petstore.swg.json")
        );
        assert_eq!(
            sidecar_path(Path::new("out/Petstore.ts")),
            PathBuf::from("out/Petstore.ts.swg.json")
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Api.swg.json");
        let config = SwgConfig {
            sources: vec!["petstore.json".into()],
            target: Some("out/Api".into()),
            languages: TargetLanguages::CLASS_BASED,
            namespace: "Acme".into(),
            ..SwgConfig::default()
        };
        save(&path, &config).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["generator_version"], GENERATOR_VERSION);
        assert_eq!(raw["config"]["languages"], serde_json::json!(["csharp"]));
        assert_eq!(load(&path).unwrap(), config);
    }

    #[test]
    fn test_newer_minor_is_refused() {
        let err = check_compatible("0.4.0", "0.3.9").unwrap_err();
        assert!(matches!(err, SettingsError::IncompatibleSettings { ref found, .. } if found == "0.4.0"));
        assert!(check_compatible("1.0.0", "0.9.0").is_err());
    }

    #[test]
    fn test_same_or_older_is_accepted() {
        assert!(check_compatible("0.3.7", "0.3.0").is_ok());
        assert!(check_compatible("0.2.0", "0.3.0").is_ok());
        assert!(check_compatible("0", "0.3.0").is_ok());
    }

    #[test]
    fn test_garbage_version() {
        assert!(matches!(
            check_compatible("next", "0.3.0"),
            Err(SettingsError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_load_refuses_newer_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Api.swg.json");
        fs::write(
            &path,
            r#"{"generator_version": "99.0.0", "config": {"sources": ["a.json"]}}"#,
        )
        .unwrap();
        assert!(matches!(
            load(&path),
            Err(SettingsError::IncompatibleSettings { .. })
        ));
    }
}
