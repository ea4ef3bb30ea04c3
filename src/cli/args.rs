use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the nodetype binary.
#[derive(Parser, Debug)]
#[command(
    name = "nodetype",
    version,
    about = "Resolve effective node types from a set of node type declarations"
)]
pub struct CliArgs {
    /// JSON file holding an array of node type declarations.
    pub declarations: PathBuf,

    /// Node types to aggregate, comma-separated (e.g. `nt:file,mix:title`).
    /// May be repeated; each occurrence is resolved separately.
    #[arg(short = 'r', long = "resolve", value_name = "TYPES")]
    pub resolve: Vec<String>,

    /// Evict cached aggregates including this node type after resolving.
    #[arg(short = 'i', long = "invalidate", value_name = "NAME")]
    pub invalidate: Vec<String>,

    /// Print the cache contents last.
    #[arg(long)]
    pub dump: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, ignore_case = true)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl CliArgs {
    /// The `--resolve` requests split into names, empty segments dropped.
    pub fn resolve_requests(&self) -> Vec<Vec<String>> {
        self.resolve
            .iter()
            .map(|request| {
                request
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }
}
