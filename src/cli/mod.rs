//! KE-010: CLI subcommands: init, validate, build, mappings, suffix.

use crate::core::{discovery, fragments, mapping::MappingRegistry, parser, types};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new kenrich project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate kenrich.yaml without reading any fragments
    Validate {
        /// Path to kenrich.yaml
        #[arg(short, long, default_value = "kenrich.yaml")]
        file: PathBuf,
    },

    /// Enrich all fragments of the resource directory into one resource list
    Build {
        /// Path to kenrich.yaml
        #[arg(short, long, default_value = "kenrich.yaml")]
        file: PathBuf,

        /// Resource directory (overrides resource_dir, relative to the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Default resource name (overrides name)
        #[arg(short, long)]
        name: Option<String>,

        /// Write the list here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Show the filename type → kind table
    Mappings {
        /// Path to kenrich.yaml (optional; built-in mappings only when absent)
        #[arg(short, long, default_value = "kenrich.yaml")]
        file: PathBuf,
    },

    /// Print the suffixed name for a kind (e.g. `web-service`)
    Suffix {
        /// Base name
        name: String,

        /// Resource kind
        kind: String,

        /// Path to kenrich.yaml (optional; built-in mappings only when absent)
        #[arg(short, long, default_value = "kenrich.yaml")]
        file: PathBuf,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Build {
            file,
            dir,
            name,
            output,
            json,
        } => cmd_build(
            &file,
            dir.as_deref(),
            name.as_deref(),
            output.as_deref(),
            json,
        ),
        Commands::Mappings { file } => cmd_mappings(&file),
        Commands::Suffix { name, kind, file } => cmd_suffix(&file, &name, &kind),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("kenrich.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let resource_dir = path.join("src").join("main").join("jkube");
    std::fs::create_dir_all(&resource_dir)
        .map_err(|e| format!("cannot create resource dir: {}", e))?;

    let dir_name = path
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "my-app".to_string());

    let template = format!(
        r#"version: "1.0"
name: {}
description: "Resource fragments enriched by kenrich"

resource_dir: src/main/jkube

# Extra filename types, on top of the built-in ones (see `kenrich mappings`)
mappings: []

api_versions:
  overrides: {{}}
"#,
        dir_name
    );
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized kenrich project at {}", path.display());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}/", resource_dir.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let registry = load_registry(&config)?;
    println!(
        "OK: {} ({} custom mappings, {} filename types)",
        config.name,
        config.mappings.len(),
        registry.len()
    );
    Ok(())
}

/// Parse and validate a kenrich config file, returning errors if invalid.
fn parse_and_validate(file: &Path) -> Result<types::KenrichConfig, String> {
    let config = parser::parse_config_file(file)?;
    let errors = parser::validate_config(&config);
    if errors.is_empty() {
        return Ok(config);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(format!("{} validation error(s)", errors.len()))
}

/// Built-in mappings plus the project's own.
fn load_registry(config: &types::KenrichConfig) -> Result<MappingRegistry, String> {
    let registry = MappingRegistry::with_defaults().map_err(|e| e.to_string())?;
    registry
        .upsert_configs(&config.mappings)
        .map_err(|e| e.to_string())?;
    Ok(registry)
}

/// Registry for commands where kenrich.yaml is optional.
fn load_optional_registry(file: &Path) -> Result<MappingRegistry, String> {
    if file.exists() {
        let config = parse_and_validate(file)?;
        load_registry(&config)
    } else {
        tracing::debug!(file = %file.display(), "no config file, using built-in mappings");
        MappingRegistry::with_defaults().map_err(|e| e.to_string())
    }
}

fn cmd_build(
    file: &Path,
    dir_override: Option<&Path>,
    name_override: Option<&str>,
    output: Option<&Path>,
    json: bool,
) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let registry = load_registry(&config)?;

    // resource_dir is relative to the config file
    let resource_dir = match dir_override {
        Some(dir) => dir.to_path_buf(),
        None => file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&config.resource_dir),
    };
    let default_name = name_override.unwrap_or(&config.name);

    let files = discovery::list_fragment_files(&resource_dir)?;
    let list =
        fragments::build_resource_list(&registry, &config.api_versions, default_name, &files)
            .map_err(|e| e.to_string())?;

    let rendered = if json {
        serde_json::to_string_pretty(&list).map_err(|e| format!("serialize error: {}", e))?
    } else {
        serde_yaml_ng::to_string(&list).map_err(|e| format!("serialize error: {}", e))?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
            eprintln!("Wrote {} resource(s) to {}", list.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn cmd_mappings(file: &Path) -> Result<(), String> {
    let registry = load_optional_registry(file)?;
    let entries = registry.entries();
    let width = entries.iter().map(|(t, _)| t.len()).max().unwrap_or(0);
    for (token, kind) in &entries {
        println!("{:<width$}  {}", token, kind, width = width);
    }
    Ok(())
}

fn cmd_suffix(file: &Path, name: &str, kind: &str) -> Result<(), String> {
    let registry = load_optional_registry(file)?;
    println!("{}", registry.suffix_for_kind(name, kind));
    Ok(())
}
