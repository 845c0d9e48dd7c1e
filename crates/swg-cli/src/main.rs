mod engine;
mod loader;
mod settings;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use swg_core::config::{self, CONFIG_FILE_NAME, SwgConfig, TargetLanguage};
use swg_core::ir::{Schema, Specification};
use swg_core::parse;

use engine::RunReport;
use loader::{FileAndUrlLoader, SourceLoader};

#[derive(Parser)]
#[command(name = "swg", about = "Swagger 2.0 client generator for C# and TypeScript", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate client code from one or more Swagger documents
    Generate(GenerateArgs),

    /// Validate Swagger documents
    Validate {
        /// Paths or URLs of the documents
        #[arg(short, long = "input", required = true)]
        inputs: Vec<String>,
    },

    /// Inspect the parsed IR of a Swagger document
    Inspect {
        /// Path or URL of the document
        #[arg(short, long)]
        input: String,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new swg configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Paths or URLs of the documents; replaces the configured sources
    #[arg(short, long = "input")]
    inputs: Vec<String>,

    /// Output path, without extension when generating both languages
    #[arg(short, long)]
    target: Option<String>,

    /// Regenerate from a saved `<target>.swg.json` instead of `.swg.yaml`
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Languages to emit; replaces the configured languages
    #[arg(short, long = "language", value_enum)]
    languages: Vec<LanguageArg>,

    #[arg(long)]
    namespace: Option<String>,

    /// Seconds generated clients wait on a request
    #[arg(long)]
    http_timeout: Option<u64>,

    /// Replace existing output files
    #[arg(long)]
    allow_override: bool,

    /// Write `<target>.swg.json` next to the output
    #[arg(long)]
    save_settings: bool,

    /// Base URL for every generated client
    #[arg(long)]
    base_url: Option<String>,
}

impl GenerateArgs {
    /// Flags win over file-based configuration.
    fn apply(self, cfg: &mut SwgConfig) {
        if !self.inputs.is_empty() {
            cfg.sources = self.inputs;
        }
        if let Some(target) = self.target {
            cfg.target = Some(target);
        }
        if !self.languages.is_empty() {
            cfg.languages = self
                .languages
                .into_iter()
                .map(TargetLanguage::from)
                .collect::<Vec<_>>()
                .into();
        }
        if let Some(namespace) = self.namespace {
            cfg.namespace = namespace;
        }
        if let Some(seconds) = self.http_timeout {
            cfg.http_timeout_seconds = seconds;
        }
        if self.base_url.is_some() {
            cfg.base_url = self.base_url;
        }
        cfg.allow_override |= self.allow_override;
        cfg.save_settings |= self.save_settings;
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    Csharp,
    Typescript,
}

impl From<LanguageArg> for TargetLanguage {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Csharp => TargetLanguage::Csharp,
            LanguageArg::Typescript => TargetLanguage::Typescript,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Validate { inputs } => cmd_validate(inputs),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "swg", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<SwgConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn source_loader(cfg: &SwgConfig) -> Result<FileAndUrlLoader> {
    FileAndUrlLoader::new(Duration::from_secs(cfg.http_timeout_seconds))
        .context("failed to set up source loading")
}

fn load_spec(loader: &dyn SourceLoader, source: &str) -> Result<Specification> {
    let text = loader.load(source)?;
    parse::parse_specification(source, &text).with_context(|| format!("failed to parse {source}"))
}

fn print_report(report: &RunReport) {
    for output in &report.outputs {
        eprintln!(
            "  wrote {} ({}, {} of the sources)",
            output.path.display(),
            output.language,
            output.emitted.len()
        );
    }
    if let Some(path) = &report.settings {
        eprintln!("  wrote {}", path.display());
    }
    for diagnostic in &report.diagnostics {
        eprintln!("  warning: {diagnostic}");
    }
    for (source, err) in &report.parse_failures {
        eprintln!("  error: {source}: {err}");
    }
    for (language, failure) in &report.emit_failures {
        eprintln!("  error: {language}: {failure}");
    }
}

fn cmd_generate(args: GenerateArgs) -> Result<()> {
    let mut cfg = match &args.settings {
        Some(path) => settings::load(path)?,
        None => try_load_config()?.unwrap_or_default(),
    };
    args.apply(&mut cfg);

    let loader = source_loader(&cfg)?;
    eprintln!("Generating {} source(s)", cfg.sources.len());
    let report = engine::run(&cfg, &loader)?;
    print_report(&report);

    if report.has_failures() {
        anyhow::bail!(
            "{} source(s) failed to parse, {} emission(s) failed",
            report.parse_failures.len(),
            report.emit_failures.len()
        );
    }
    eprintln!("Generation successful.");
    Ok(())
}

fn cmd_validate(inputs: Vec<String>) -> Result<()> {
    let loader = source_loader(&SwgConfig::default())?;
    let mut failed = 0;

    for input in &inputs {
        let spec = match load_spec(&loader, input) {
            Ok(spec) => spec,
            Err(err) => {
                eprintln!("Invalid {input}: {err:#}");
                failed += 1;
                continue;
            }
        };

        eprintln!("Valid Swagger {} document: {}", spec.swagger, spec.info.title);
        eprintln!("  Version: {}", spec.info.version);
        eprintln!("  Paths: {}", spec.paths.len());
        eprintln!("  Operations: {}", spec.operations().count());
        eprintln!("  Definitions: {}", spec.definitions.len());
        for diagnostic in spec.diagnostics() {
            eprintln!("  warning: {diagnostic}");
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} document(s) failed validation", inputs.len());
    }
    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: String, format: InspectFormat) -> Result<()> {
    let loader = source_loader(&SwgConfig::default())?;
    let spec = load_spec(&loader, &input)?;

    let summary = build_inspect_summary(&spec);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(spec: &Specification) -> serde_json::Value {
    let definitions: Vec<serde_json::Value> = spec
        .definitions
        .iter()
        .map(|(name, schema)| {
            serde_json::json!({
                "name": name,
                "kind": match schema {
                    Schema::Object(_) => "object",
                    Schema::Array(_) => "array",
                    Schema::Primitive(p) if p.is_string_enum() => "enum",
                    Schema::Primitive(_) => "primitive",
                    Schema::Reference(_) => "alias",
                },
            })
        })
        .collect();

    let operations: Vec<serde_json::Value> = spec
        .operations()
        .map(|(_, op)| {
            serde_json::json!({
                "name": op.label(),
                "method": op.method.as_str(),
                "path": op.path,
                "success": op.canonical_success().and_then(|r| r.status.code()),
                "oauth": op.oauth_secured,
                "tags": op.tags,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": spec.info.title,
            "version": spec.info.version,
        },
        "base_url": spec.base_url(),
        "definitions": definitions,
        "operations": operations,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swg_core::config::TargetLanguages;

    const INVENTORY: &str = include_str!("../../swg-core/tests/fixtures/inventory.json");

    #[test]
    fn test_cli_definition_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "swg", "generate", "-i", "a.json", "-i", "b.json", "--language", "typescript",
            "--namespace", "Acme", "--http-timeout", "5", "--allow-override",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let mut cfg = SwgConfig {
            sources: vec!["configured.json".into()],
            target: Some("out/Api".into()),
            ..SwgConfig::default()
        };
        args.apply(&mut cfg);

        assert_eq!(cfg.sources, vec!["a.json", "b.json"]);
        assert_eq!(cfg.target.as_deref(), Some("out/Api"));
        assert_eq!(cfg.languages, TargetLanguages::INTERFACE_BASED);
        assert_eq!(cfg.namespace, "Acme");
        assert_eq!(cfg.http_timeout_seconds, 5);
        assert!(cfg.allow_override);
        assert!(!cfg.save_settings);
    }

    #[test]
    fn test_inspect_summary() {
        let spec = parse::parse_specification("inventory.json", INVENTORY).unwrap();
        let summary = build_inspect_summary(&spec);
        let kinds: Vec<(&str, &str)> = summary["definitions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| (d["name"].as_str().unwrap(), d["kind"].as_str().unwrap()))
            .collect();
        assert!(kinds.contains(&("Sku", "primitive")));
        assert!(kinds.contains(&("Labels", "array")));
        assert_eq!(
            summary["operations"].as_array().unwrap().len(),
            spec.operations().count()
        );
    }
}
