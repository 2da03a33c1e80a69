mod codegen;
mod config;
mod format;
mod io;
mod template;


use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Parser, Debug)]
#[command(name = "csegen")]
#[command(version)]
#[command(about = "Deterministic batch CSE session generator for turbomachinery post-processing")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the TOML job file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output directory (overrides job.output_dir)
    #[arg(short, long, global = true)]
    out: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the session script from a job file
    Generate {
        /// Prepend expressions from a JSON template
        #[arg(long)]
        template: Option<String>,
        /// Write a JSON manifest next to the script
        #[arg(long)]
        json: bool,
    },
    /// Parse and validate a job file without generating
    Validate,
    /// Write the built-in starter expression template
    Template {
        /// Destination path for the template JSON
        #[arg(long, default_value = "template.json")]
        to: String,
    },
    /// Print version information
    Version,
}

/// Provenance record written next to the script on `--json`. The script
/// itself carries no timestamps or hashes; everything nondeterministic
/// lives here.
#[derive(Serialize)]
struct Manifest {
    schema_version: String,
    generator_version: String,
    config_hash: String,
    script: String,
    script_bytes: usize,
    enabled_expressions: usize,
    curves: usize,
    config_snapshot: config::Root,
}

fn compute_hash(data: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn load_config(path: &str) -> Result<(config::Root, String)> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read job file: {}", path))?;
    let cfg: config::Root = toml::from_str(&text)
        .with_context(|| format!("failed to parse job file: {}", path))?;
    Ok((cfg, text))
}

fn run_generate(
    mut cfg: config::Root,
    cfg_text: &str,
    template_path: Option<&str>,
    json_output: bool,
) -> Result<()> {
    if let Some(path) = template_path {
        let tpl = template::load(Path::new(path))?;
        eprintln!(
            "[csegen] template '{}': {} expressions",
            tpl.name,
            tpl.expressions.len()
        );
        let mut merged = tpl.expressions;
        merged.append(&mut cfg.expressions);
        cfg.expressions = merged;
    }

    // Merged expression lists can collide, so validation runs after the
    // template is folded in.
    cfg.validate()?;

    let script = codegen::generate(&cfg);
    let out_dir = PathBuf::from(&cfg.job.output_dir);
    let script_path = io::write_script(&out_dir, &cfg.job.script_name, &script)?;

    eprintln!(
        "[csegen] script written: {} ({} bytes)",
        script_path.display(),
        script.len()
    );
    eprintln!(
        "[csegen] domains={} result_files={} expressions={} curves={}",
        cfg.job.domains.len(),
        cfg.job.result_files.len(),
        cfg.enabled_expressions().len(),
        cfg.curves.len()
    );

    if json_output {
        let manifest = Manifest {
            schema_version: SCHEMA_VERSION.to_string(),
            generator_version: VERSION.to_string(),
            config_hash: compute_hash(cfg_text),
            script: format::canonicalize_path(&script_path.to_string_lossy()),
            script_bytes: script.len(),
            enabled_expressions: cfg.enabled_expressions().len(),
            curves: cfg.curves.len(),
            config_snapshot: cfg.clone(),
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        let manifest_path = io::write_json(&out_dir, "manifest.json", &json)?;
        eprintln!("[csegen] JSON manifest: {}", manifest_path.display());
    }

    Ok(())
}

fn run_validate(cfg: &config::Root, cfg_path: &str) -> Result<()> {
    cfg.validate()?;

    eprintln!("[csegen] job valid: {}", cfg_path);
    if let Some(project) = &cfg.project {
        eprintln!("  project: {} v{}", project.name, project.version);
    }
    eprintln!("  domains: {}", cfg.job.domains.join(", "));
    eprintln!("  result files: {}", cfg.job.result_files.len());
    eprintln!(
        "  expressions: {} ({} enabled)",
        cfg.expressions.len(),
        cfg.enabled_expressions().len()
    );
    for c in &cfg.curves {
        eprintln!(
            "  curve '{}': {} -> {}, {} points",
            c.name,
            c.inlet,
            c.outlet,
            c.files.len()
        );
    }

    Ok(())
}

fn run_template(to: &str) -> Result<()> {
    let tpl = template::builtin();
    template::save(Path::new(to), &tpl)?;
    eprintln!(
        "[csegen] template '{}' written: {} ({} expressions)",
        tpl.name,
        to,
        tpl.expressions.len()
    );
    Ok(())
}

fn print_version() {
    eprintln!("csegen - batch CSE session generator");
    eprintln!();
    eprintln!("  Generator Version: {}", VERSION);
    eprintln!("  Manifest Schema:   {}", SCHEMA_VERSION);
    eprintln!("  Platform:          {}", std::env::consts::OS);
    eprintln!("  Architecture:      {}", std::env::consts::ARCH);
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Apply the output-directory override before anything reads it.
    let with_override = |mut cfg: config::Root| {
        if let Some(out) = &args.out {
            cfg.job.output_dir = out.clone();
        }
        cfg
    };

    match args.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Template { to }) => run_template(&to),
        Some(Commands::Validate) => {
            let cfg_path = args.config.context("--config required for validate")?;
            let (cfg, _) = load_config(&cfg_path)?;
            run_validate(&with_override(cfg), &cfg_path)
        }
        Some(Commands::Generate { template, json }) => {
            let cfg_path = args.config.context("--config required")?;
            let (cfg, cfg_text) = load_config(&cfg_path)?;
            run_generate(with_override(cfg), &cfg_text, template.as_deref(), json)
        }
        None => {
            let cfg_path = args.config.context("--config required")?;
            let (cfg, cfg_text) = load_config(&cfg_path)?;
            run_generate(with_override(cfg), &cfg_text, None, false)
        }
    }
}
