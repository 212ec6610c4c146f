//! Utils

use clap::{Parser, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::multiplier::Selection;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Compact,

    /// One JSON object per event
    Json,
}

/// Arguments for the calculator example
#[derive(Debug, Parser)]
pub struct ExampleCalculatorArgs {
    /// Configuration set to load from `fixtures/`
    #[clap(short, long, default_value = "paint")]
    pub fixture: String,

    /// Value entered by the shopper
    #[clap(short, long)]
    pub input: String,

    /// Selected primary dropdown option (1-based)
    #[clap(short, long)]
    pub option: Option<usize>,

    /// Selected secondary dropdown option (1-based)
    #[clap(long)]
    pub option2: Option<usize>,

    /// Log output format
    #[clap(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl ExampleCalculatorArgs {
    /// Dropdown selection given on the command line.
    pub fn selection(&self) -> Selection {
        Selection {
            primary: self.option,
            secondary: self.option2,
        }
    }
}

/// Install a global `tracing` subscriber. `RUST_LOG` overrides the default `info` level.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}
