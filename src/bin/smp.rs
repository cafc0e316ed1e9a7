//! smp - Structured Merge Patch CLI tool
//!
//! Computes and applies JSON merge patches between YAML/JSON documents.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use structured_merge_patch::value::{self, Value};
use structured_merge_patch::{merge_patch, MergePatchHelper, Options};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "smp", version, about = "Structured Merge Patch CLI tool")]
struct Cli {
    /// Enable debug logging (otherwise RUST_LOG, defaulting to warnings).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output location. Use '-' for stdout.
    #[arg(short, long, default_value = "-", global = true)]
    output: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Json, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the merge patch that aligns the observed document with the desired one.
    Diff {
        /// Current state of the resource.
        #[arg(long)]
        observed: PathBuf,
        /// Intended state of the resource.
        #[arg(long)]
        desired: PathBuf,
        /// Path to exclude from comparison, e.g. metadata.resourceVersion. Repeatable.
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,
        /// Exclude status and server-managed metadata.
        #[arg(long)]
        server_managed: bool,
        /// Options file (YAML or JSON).
        #[arg(short, long, env = "SMP_CONFIG")]
        config: Option<PathBuf>,
        /// Exit with status 1 when the patch is not empty.
        #[arg(long)]
        check: bool,
    },
    /// Apply a merge patch to a document.
    Apply {
        /// Document to patch.
        #[arg(long)]
        target: PathBuf,
        /// JSON merge patch.
        #[arg(long)]
        patch: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };

    match cli.command {
        Command::Diff {
            observed,
            desired,
            exclude,
            server_managed,
            config,
            check,
        } => {
            let mut options = match config {
                Some(path) => Options::load(&path)
                    .map_err(|e| format!("Failed to load options from {:?}: {}", path, e))?,
                None => Options::default(),
            };
            options = options.exclude_all(exclude);
            if server_managed {
                options = options.server_managed(true);
            }

            let changed = diff(&observed, &desired, &options, cli.format, &mut output)?;
            if check && changed {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Apply { target, patch } => {
            apply(&target, &patch, cli.format, &mut output)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_document(file: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let content =
        fs::read_to_string(file).map_err(|e| format!("Failed to read file {:?}: {}", file, e))?;

    let parsed = match file.extension().and_then(|ext| ext.to_str()) {
        Some("json") => value::from_json_str(&content),
        _ => value::from_yaml_str(&content),
    };
    parsed.map_err(|e| format!("Failed to parse {:?}: {}", file, e).into())
}

fn write_value(
    value: &Value,
    format: Format,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        Format::Json => writeln!(output, "{}", value::to_json(value)?)?,
        Format::Yaml => write!(output, "{}", value::to_yaml(value)?)?,
    }
    Ok(())
}

fn diff(
    observed_file: &Path,
    desired_file: &Path,
    options: &Options,
    format: Format,
    output: &mut dyn Write,
) -> Result<bool, Box<dyn std::error::Error>> {
    let observed = read_document(observed_file)?;
    let desired = read_document(desired_file)?;
    debug!(excluded = options.exclude_paths.len(), "computing merge patch");

    let helper = MergePatchHelper::new(&observed, &desired, options)?;
    if helper.has_changes() {
        info!(fields = helper.overlay().len(), "documents differ");
    } else {
        info!("documents are aligned");
    }

    match format {
        Format::Json => {
            output.write_all(helper.patch_bytes())?;
            writeln!(output)?;
        }
        Format::Yaml => write_value(&Value::Map(helper.overlay().clone()), format, output)?,
    }

    Ok(helper.has_changes())
}

fn apply(
    target_file: &Path,
    patch_file: &Path,
    format: Format,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = read_document(target_file)?;
    let patch = read_document(patch_file)?;

    let patched = merge_patch(&target, &patch);
    write_value(&patched, format, output)
}
