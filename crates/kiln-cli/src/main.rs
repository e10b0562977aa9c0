//! kiln CLI - parallel build driver for C sources.

mod build;
mod colors;
mod progress;

use std::path::PathBuf;

use clap::Parser;
use kiln_core::BuildConfig;
use kiln_core::config::{DEFAULT_COMPILER, DEFAULT_FLAGS, DEFAULT_JOBS};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Compile every C file in a tree in parallel and link the result")]
#[command(version)]
struct Cli {
    /// Root source directory
    #[arg(long, default_value = "src")]
    src: PathBuf,

    /// Output directory for object files and the binary
    #[arg(long, default_value = "build")]
    out: PathBuf,

    /// Compiler flags, space separated (also used when linking)
    #[arg(long, default_value = DEFAULT_FLAGS, allow_hyphen_values = true)]
    flags: String,

    /// Include directories, comma separated
    #[arg(long, default_value = "")]
    include: String,

    /// Name of the output binary
    #[arg(long, default_value = "program")]
    bin: String,

    /// Number of parallel compilation jobs
    #[arg(short, long, default_value_t = DEFAULT_JOBS, value_parser = parse_jobs)]
    jobs: usize,

    /// Compiler used for compiling and linking
    #[arg(long, default_value = DEFAULT_COMPILER)]
    cc: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> BuildConfig {
        BuildConfig {
            source_root: self.src,
            output_root: self.out,
            include_dirs: BuildConfig::parse_include_list(&self.include),
            flags: self.flags,
            binary_name: self.bin,
            jobs: self.jobs,
            verbose: self.verbose,
            compiler: self.cc,
        }
    }
}

fn parse_jobs(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(jobs) => Ok(jobs),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Helper to format kiln-core errors with recovery hints
    let format_error = |err: anyhow::Error| -> anyhow::Error {
        if let Some(kiln_err) = err.downcast_ref::<kiln_core::Error>() {
            anyhow::anyhow!("{}", kiln_err.with_hint())
        } else {
            err
        }
    };

    build::execute(cli.into_config()).map_err(format_error)
}
