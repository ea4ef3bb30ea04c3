//! Tracing subscriber setup for the `nodetype` binary.
//!
//! Output format is chosen with `NODETYPE_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented span hierarchy via `tracing-tree`
//! - `json`: one JSON object per event
//!
//! ```bash
//! # Why did a merge fail?
//! NODETYPE_LOG=nodetype_solver=debug nodetype types.json --resolve nt:file,mix:title
//!
//! # Cache traffic as a tree
//! NODETYPE_LOG=nodetype_solver=trace NODETYPE_LOG_FORMAT=tree nodetype types.json --dump
//!
//! # Structured resolve queries only
//! NODETYPE_LOG=nodetype::query_json=trace NODETYPE_LOG_FORMAT=json \
//!     nodetype types.json --resolve nt:file
//! ```
//!
//! Nothing is installed unless `NODETYPE_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const LOG_ENV: &str = "NODETYPE_LOG";
const LOG_FORMAT_ENV: &str = "NODETYPE_LOG_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }
}

/// `NODETYPE_LOG` wins over `RUST_LOG`; both use `EnvFilter` directive syntax.
fn build_filter() -> Option<EnvFilter> {
    match std::env::var(LOG_ENV) {
        Ok(directives) => Some(EnvFilter::builder().parse_lossy(directives)),
        Err(_) if std::env::var("RUST_LOG").is_ok() => Some(EnvFilter::from_default_env()),
        Err(_) => None,
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Returns without installing anything when no filter is configured, and
/// silently keeps an already installed subscriber.
pub fn init_tracing() {
    let Some(filter) = build_filter() else {
        return;
    };

    let _ = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::new(2)
                .with_indent_lines(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse("bogus"), LogFormat::Text);
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
