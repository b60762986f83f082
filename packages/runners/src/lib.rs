//! Shared plumbing for the module runners.
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wasmrun_host::{console::Console, runtime::Container};

/// Where the bundled modules live.
pub const MODULE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/modules");

#[derive(Args, Debug)]
pub struct ModuleArgs {
    /// Load this module instead of the bundled one. This can be text or binary
    /// format
    #[arg(long, value_name = "FILE")]
    module: Option<PathBuf>,

    /// Directory to find the bundled module in
    #[arg(long, value_name = "DIR", env = "WASMRUN_MODULE_DIR", default_value = MODULE_DIR)]
    module_dir: PathBuf,
}

impl ModuleArgs {
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.module
            .clone()
            .unwrap_or_else(|| self.module_dir.join(file_name))
    }

    /// Load and instantiate the module, with console output on stdout.
    pub fn load(&self, file_name: &str) -> Result<Container> {
        Container::from_file(&self.path(file_name), Console::stdout())
    }
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (`warn` by default).
/// Results are printed to stdout.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
