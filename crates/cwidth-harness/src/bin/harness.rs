//! CLI entrypoint for the cwidth harness.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use cwidth_core::{Header, Policy, SigAtomicOrder, TypeRegistry, global_registry};
use cwidth_harness::emit::{emit_headers, render_header};
use cwidth_harness::structured_log::{LogEmitter, validate_log_file};
use cwidth_harness::{DescriptorSource, HarnessError, ResolutionRun, TableReport, host_descriptor};

/// Type-width resolution tooling.
#[derive(Debug, Parser)]
#[command(name = "cwidth-harness")]
#[command(about = "Resolve C integer type widths and emit portable headers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Descriptor selection shared by every resolving command. With none of
/// these flags the descriptor is read from `CWIDTH_<PARAM>_BITS`.
#[derive(Debug, Args)]
struct SourceArgs {
    /// JSON descriptor file.
    #[arg(long, conflicts_with_all = ["preset", "host"])]
    descriptor: Option<PathBuf>,
    /// Named data model: lp64, ilp32, llp64, ilp64 or lp32.
    #[arg(long, conflicts_with = "host")]
    preset: Option<String>,
    /// Probe the C ABI this binary was built for.
    #[arg(long)]
    host: bool,
    /// Signal-atomic search order (`legacy` or `rank`); defaults to
    /// `CWIDTH_SIG_ATOMIC_ORDER`.
    #[arg(long)]
    sig_atomic_order: Option<String>,
    /// Run identifier used in trace ids and the artifact index.
    #[arg(long, default_value = "local")]
    run_id: String,
    /// Structured JSONL log path.
    #[arg(long)]
    log: Option<PathBuf>,
}

impl SourceArgs {
    fn source(&self) -> Result<DescriptorSource, HarnessError> {
        if let Some(path) = &self.descriptor {
            return Ok(DescriptorSource::File(path.clone()));
        }
        if let Some(name) = &self.preset {
            return Ok(DescriptorSource::Preset(name.parse()?));
        }
        if self.host {
            return Ok(DescriptorSource::Host);
        }
        Ok(DescriptorSource::Env)
    }

    fn policy(&self) -> Result<Policy, HarnessError> {
        match &self.sig_atomic_order {
            Some(order) => Ok(Policy::new(order.parse::<SigAtomicOrder>()?)),
            None => Ok(Policy::try_from_env()?),
        }
    }

    fn emitter(&self) -> Result<LogEmitter, HarnessError> {
        Ok(match &self.log {
            Some(path) => LogEmitter::to_file(path, "harness", &self.run_id)?,
            None => LogEmitter::to_buffer("harness", &self.run_id),
        })
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve a descriptor and print the JSON table report.
    Resolve {
        #[command(flatten)]
        source: SourceArgs,
        /// Comma-separated headers to resolve (default: all).
        #[arg(long, value_delimiter = ',')]
        headers: Vec<String>,
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render headers from a resolved descriptor.
    Emit {
        #[command(flatten)]
        source: SourceArgs,
        /// Single header to print to stdout (e.g. `stdint.h`).
        #[arg(long, conflicts_with = "out_dir")]
        header: Option<String>,
        /// Directory to write every header and `artifact_index.json` into.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the probed host descriptor as JSON.
    HostDescriptor {
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        /// Log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn parse_headers(names: &[String]) -> Result<Vec<Header>, HarnessError> {
    if names.is_empty() {
        return Ok(Header::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| name.parse::<Header>().map_err(HarnessError::from))
        .collect()
}

fn write_or_print(output: Option<PathBuf>, body: &str) -> Result<(), HarnessError> {
    match output {
        Some(path) => {
            std::fs::write(&path, body)?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{body}"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve {
            source,
            headers,
            output,
        } => {
            let origin = source.source()?;
            let descriptor = origin.load()?;
            let run = ResolutionRun::new(source.policy()?, parse_headers(&headers)?);
            let mut log = source.emitter()?;
            let table = run.run(&origin.to_string(), &descriptor, global_registry(), &mut log)?;
            let report = TableReport::from_table(&table, origin.to_string());
            write_or_print(output, &report.to_json()?)?;
        }
        Command::Emit {
            source,
            header,
            out_dir,
        } => {
            let origin = source.source()?;
            let descriptor = origin.load()?;
            let single = header.as_deref().map(str::parse::<Header>).transpose()?;
            let headers = single.map_or_else(|| Header::ALL.to_vec(), |h| vec![h]);
            let mut log = source.emitter()?;
            let registry = TypeRegistry::new();
            let table = ResolutionRun::new(source.policy()?, headers).run(
                &origin.to_string(),
                &descriptor,
                &registry,
                &mut log,
            )?;
            match (single, out_dir) {
                (Some(h), _) => print!("{}", render_header(&table, h)),
                (None, Some(dir)) => {
                    let index = emit_headers(&table, &dir, &mut log)?;
                    let index_path = dir.join("artifact_index.json");
                    std::fs::write(&index_path, index.to_json()?)?;
                    eprintln!(
                        "Wrote {} headers and {}",
                        index.artifacts.len(),
                        index_path.display()
                    );
                }
                (None, None) => {
                    return Err(HarnessError::Usage(String::from(
                        "emit needs --header or --out-dir",
                    ))
                    .into());
                }
            }
        }
        Command::HostDescriptor { output } => {
            let body = serde_json::to_string_pretty(&host_descriptor())?;
            write_or_print(output, &body)?;
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for error in &errors {
                eprintln!("{error}");
            }
            if !errors.is_empty() {
                return Err(HarnessError::LogValidation {
                    count: errors.len(),
                }
                .into());
            }
            eprintln!("{}: {lines} valid line(s)", log.display());
        }
    }

    Ok(())
}
