//! Build command implementation for kiln CLI.
//!
//! Compiles every C file under the source root and links the binary.

use kiln_core::{BuildConfig, Builder};

use crate::colors;
use crate::progress::ProgressCallback;

/// Run a full build with the given configuration.
pub fn execute(config: BuildConfig) -> anyhow::Result<()> {
    let verbose = config.verbose;

    let mut builder = Builder::new(config)?;
    builder.set_callback(ProgressCallback::new(verbose));

    let Some(summary) = builder.run()? else {
        println!(
            "{}No C files found in the source directory.{}",
            colors::YELLOW,
            colors::RESET
        );
        return Ok(());
    };

    if verbose {
        println!(
            "{}Compiled {} files in {:.2}s{}",
            colors::DIM,
            summary.compiled,
            summary.elapsed.as_secs_f64(),
            colors::RESET
        );
    }

    println!(
        "{}Successfully compiled and linked to{} {}{}{}",
        colors::GREEN,
        colors::RESET,
        colors::BOLD,
        summary.binary.display(),
        colors::RESET
    );

    Ok(())
}
