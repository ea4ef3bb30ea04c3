use anyhow::Result;
use clap::Parser;

use nodetype::cli::args::CliArgs;
use nodetype::cli::driver;

fn main() -> Result<()> {
    // Initialize tracing if NODETYPE_LOG or RUST_LOG is set (zero cost otherwise).
    // Supports NODETYPE_LOG_FORMAT=tree|json|text (see src/tracing_config.rs).
    nodetype::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    driver::run(&args, &mut out)
}
