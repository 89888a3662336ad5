//! Main entry point for the variant-interpretation CLI.

use clap::Parser;
use variant_interpretation::{common, pipeline};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Download variant files and annotate them with ClinVar annotations"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// Arguments of the pipeline
    #[command(flatten)]
    args: pipeline::Args,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    tracing::subscriber::with_default(collector, || {
        tracing::info!(
            "variant-interpretation {} startup",
            common::version()
        );

        pipeline::run(&cli.common, &cli.args)?;

        tracing::info!("All done. Have a nice day!");

        Ok::<(), anyhow::Error>(())
    })?;

    Ok(())
}
