use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use swg_core::CodeGenerator;
use swg_core::config::{SwgConfig, TargetLanguage, TargetLanguages};
use swg_core::error::{Diagnostic, ParseError, SpecFailure};
use swg_core::parse;
use swg_csharp::CSharpGenerator;
use swg_typescript::TypeScriptGenerator;
use thiserror::Error;

use crate::loader::{LoadError, SourceLoader};
use crate::settings::{self, SettingsError};

/// Run-level failures. Each one stops the run before anything is emitted,
/// except `Write`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{} already exists; pass --allow-override to replace it", path.display())]
    TargetWriteConflict { path: PathBuf },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// One written document.
#[derive(Debug)]
pub struct Output {
    pub language: TargetLanguage,
    pub path: PathBuf,
    /// Source ids rendered into the document; empty for a zero-byte file.
    pub emitted: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub outputs: Vec<Output>,
    pub parse_failures: Vec<(String, ParseError)>,
    pub emit_failures: Vec<(TargetLanguage, SpecFailure)>,
    pub diagnostics: Vec<Diagnostic>,
    pub settings: Option<PathBuf>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.parse_failures.is_empty() || !self.emit_failures.is_empty()
    }
}

fn generator(language: TargetLanguage) -> Box<dyn CodeGenerator> {
    match language {
        TargetLanguage::Csharp => Box::new(CSharpGenerator),
        TargetLanguage::Typescript => Box::new(TypeScriptGenerator),
    }
}

/// Check the configuration is runnable and return its target.
pub fn validate_config(config: &SwgConfig) -> Result<&str, RunError> {
    if config.sources.is_empty() {
        return Err(RunError::InvalidConfig("no sources given".into()));
    }
    if config.languages.is_empty() {
        return Err(RunError::InvalidConfig("no target language selected".into()));
    }
    match config.target.as_deref() {
        Some(target) if !target.trim().is_empty() => Ok(target),
        _ => Err(RunError::InvalidConfig("no target path given".into())),
    }
}

fn with_suffix(target: &Path, extension: &str) -> PathBuf {
    let mut path = target.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Where each selected language is written.
///
/// A single language writes to `target`, adding its extension when the
/// target has none. Both languages write `<target>.cs` and `<target>.ts`.
pub fn output_paths(target: &Path, languages: TargetLanguages) -> Vec<(TargetLanguage, PathBuf)> {
    let selected: Vec<TargetLanguage> = languages.iter().collect();
    match selected.as_slice() {
        [language] => {
            let path = if target.extension().is_some() {
                target.to_path_buf()
            } else {
                with_suffix(target, language.extension())
            };
            vec![(*language, path)]
        }
        _ => selected
            .iter()
            .map(|language| (*language, with_suffix(target, language.extension())))
            .collect(),
    }
}

fn check_conflicts(paths: &[(TargetLanguage, PathBuf)], allow_override: bool) -> Result<(), RunError> {
    if allow_override {
        return Ok(());
    }
    match paths.iter().find(|(_, path)| path.exists()) {
        Some((_, path)) => Err(RunError::TargetWriteConflict { path: path.clone() }),
        None => Ok(()),
    }
}

fn write_output(path: &Path, content: &str) -> Result<(), RunError> {
    let write_error = |source: std::io::Error| RunError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, content).map_err(write_error)
}

/// Load, parse and emit every source of `config`.
pub fn run(config: &SwgConfig, loader: &dyn SourceLoader) -> Result<RunReport, RunError> {
    let target = PathBuf::from(validate_config(config)?);
    let paths = output_paths(&target, config.languages);
    check_conflicts(&paths, config.allow_override)?;

    let mut texts = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let text = loader.load(source)?;
        debug!("loaded {source} ({} bytes)", text.len());
        texts.push((source.as_str(), text));
    }

    let mut report = RunReport::default();
    let parsed = parse::parse_batch(texts.iter().map(|(id, text)| (*id, text.as_str())));
    let mut specs = Vec::with_capacity(parsed.len());
    for source in parsed {
        match source.outcome {
            Ok(spec) => specs.push(spec),
            Err(err) => report.parse_failures.push((source.source_id, err)),
        }
    }
    info!("parsed {} of {} sources", specs.len(), config.sources.len());

    let options = config.emit_options();
    for (language, path) in paths {
        let generation = generator(language).generate(&specs, &options);
        if generation.content.is_none() {
            warn!("no specification rendered for {language}; writing an empty {}", path.display());
        }
        write_output(&path, generation.content.as_deref().unwrap_or_default())?;
        info!("wrote {}", path.display());

        for diagnostic in generation.diagnostics {
            if !report.diagnostics.contains(&diagnostic) {
                report.diagnostics.push(diagnostic);
            }
        }
        report
            .emit_failures
            .extend(generation.failures.into_iter().map(|f| (language, f)));
        report.outputs.push(Output {
            language,
            path,
            emitted: generation.emitted,
        });
    }

    if config.save_settings {
        let path = settings::sidecar_path(&target);
        settings::save(&path, config)?;
        report.settings = Some(path);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use swg_core::error::EmitError;

    const PETSTORE: &str = include_str!("../../swg-core/tests/fixtures/petstore.json");
    const PET_SHOP: &str = include_str!("../../swg-core/tests/fixtures/pet-shop.json");
    const DANGLING: &str = include_str!("../../swg-core/tests/fixtures/dangling-ref.json");

    struct MemoryLoader(HashMap<&'static str, &'static str>);

    impl MemoryLoader {
        fn new(sources: &[(&'static str, &'static str)]) -> Self {
            Self(sources.iter().copied().collect())
        }
    }

    impl SourceLoader for MemoryLoader {
        fn load(&self, source: &str) -> Result<String, LoadError> {
            self.0
                .get(source)
                .map(|text| text.to_string())
                .ok_or_else(|| LoadError::Unavailable {
                    source_id: source.to_string(),
                    reason: "not found".into(),
                })
        }
    }

    fn config(dir: &Path, sources: &[&str]) -> SwgConfig {
        SwgConfig {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            target: Some(dir.join("out/Client").to_string_lossy().into_owned()),
            ..SwgConfig::default()
        }
    }

    #[test]
    fn test_output_paths() {
        let target = Path::new("out/Client");
        assert_eq!(
            output_paths(target, TargetLanguages::ALL),
            vec![
                (TargetLanguage::Csharp, PathBuf::from("out/Client.cs")),
                (TargetLanguage::Typescript, PathBuf::from("out/Client.ts")),
            ]
        );
        assert_eq!(
            output_paths(target, TargetLanguages::INTERFACE_BASED),
            vec![(TargetLanguage::Typescript, PathBuf::from("out/Client.ts"))]
        );
        assert_eq!(
            output_paths(Path::new("out/api.d.ts"), TargetLanguages::INTERFACE_BASED),
            vec![(TargetLanguage::Typescript, PathBuf::from("out/api.d.ts"))]
        );
    }

    #[test]
    fn test_validate_config() {
        let mut cfg = SwgConfig::default();
        assert!(matches!(validate_config(&cfg), Err(RunError::InvalidConfig(_))));
        cfg.sources = vec!["a.json".into()];
        assert!(matches!(validate_config(&cfg), Err(RunError::InvalidConfig(_))));
        cfg.target = Some("out/A".into());
        assert_eq!(validate_config(&cfg).unwrap(), "out/A");
        cfg.languages = TargetLanguages::NONE;
        assert!(matches!(validate_config(&cfg), Err(RunError::InvalidConfig(_))));
    }

    #[test]
    fn test_run_writes_both_languages() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MemoryLoader::new(&[("petstore.json", PETSTORE), ("shop.json", PET_SHOP)]);
        let report = run(&config(dir.path(), &["petstore.json", "shop.json"]), &loader).unwrap();

        assert!(!report.has_failures());
        assert_eq!(report.outputs.len(), 2);
        let cs = fs::read_to_string(dir.path().join("out/Client.cs")).unwrap();
        let ts = fs::read_to_string(dir.path().join("out/Client.ts")).unwrap();
        assert_eq!(cs.matches("public partial class Pet\n").count(), 1);
        assert_eq!(ts.matches("export interface Pet {").count(), 1);
        assert_eq!(report.outputs[0].emitted, vec!["petstore.json", "shop.json"]);
        assert!(report.settings.is_none());
    }

    #[test]
    fn test_existing_target_is_a_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), &["petstore.json"]);
        cfg.languages = TargetLanguages::CLASS_BASED;
        fs::create_dir_all(dir.path().join("out")).unwrap();
        fs::write(dir.path().join("out/Client.cs"), "// keep me\n").unwrap();

        let loader = MemoryLoader::new(&[("petstore.json", PETSTORE)]);
        let err = run(&cfg, &loader).unwrap_err();
        assert!(matches!(err, RunError::TargetWriteConflict { ref path } if path.ends_with("Client.cs")));
        assert_eq!(
            fs::read_to_string(dir.path().join("out/Client.cs")).unwrap(),
            "// keep me\n"
        );

        cfg.allow_override = true;
        run(&cfg, &loader).unwrap();
        let cs = fs::read_to_string(dir.path().join("out/Client.cs")).unwrap();
        assert!(cs.contains("namespace swg\n{"));
    }

    #[test]
    fn test_unavailable_source_aborts_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MemoryLoader::new(&[("petstore.json", PETSTORE)]);
        let err = run(&config(dir.path(), &["petstore.json", "gone.json"]), &loader).unwrap_err();
        assert!(matches!(err, RunError::Load(LoadError::Unavailable { ref source_id, .. }) if source_id == "gone.json"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_parse_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MemoryLoader::new(&[("petstore.json", PETSTORE), ("bad.json", "{ not json")]);
        let report = run(&config(dir.path(), &["bad.json", "petstore.json"]), &loader).unwrap();

        assert!(report.has_failures());
        assert_eq!(report.parse_failures.len(), 1);
        assert_eq!(report.parse_failures[0].0, "bad.json");
        assert!(report.outputs.iter().all(|o| o.emitted == vec!["petstore.json"]));
    }

    #[test]
    fn test_dangling_reference_writes_zero_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), &["broken.json"]);
        cfg.languages = TargetLanguages::INTERFACE_BASED;
        let loader = MemoryLoader::new(&[("broken.json", DANGLING)]);
        let report = run(&cfg, &loader).unwrap();

        assert_eq!(report.emit_failures.len(), 1);
        let (language, failure) = &report.emit_failures[0];
        assert_eq!(*language, TargetLanguage::Typescript);
        assert!(matches!(failure.error, EmitError::UnresolvedRef { ref name, .. } if name == "Missing"));
        assert_eq!(fs::read_to_string(dir.path().join("out/Client.ts")).unwrap(), "");
    }

    #[test]
    fn test_save_settings_writes_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), &["petstore.json"]);
        cfg.save_settings = true;
        let loader = MemoryLoader::new(&[("petstore.json", PETSTORE)]);
        let report = run(&cfg, &loader).unwrap();

        let sidecar = dir.path().join("out/Client.swg.json");
        assert_eq!(report.settings.as_deref(), Some(sidecar.as_path()));
        assert_eq!(settings::load(&sidecar).unwrap(), cfg);
    }
}
