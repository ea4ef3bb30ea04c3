//! Structured query tracing for resolver entry points.
//!
//! Events use target `nodetype::query_json` and are intended to be consumed with:
//! `NODETYPE_LOG=nodetype::query_json=trace NODETYPE_LOG_FORMAT=json`.
//!
//! Environment:
//! - `NODETYPE_QUERY_RUN_ID`: optional run identifier attached to every event.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Level, trace};

static NEXT_QUERY_ID: AtomicU64 = AtomicU64::new(1);
static QUERY_RUN_ID: OnceLock<String> = OnceLock::new();

#[inline]
pub(crate) fn enabled() -> bool {
    tracing::enabled!(target: "nodetype::query_json", Level::TRACE)
}

#[inline]
pub(crate) fn next_query_id() -> u64 {
    NEXT_QUERY_ID.fetch_add(1, Ordering::Relaxed)
}

#[inline]
fn run_id() -> &'static str {
    QUERY_RUN_ID
        .get_or_init(|| {
            std::env::var("NODETYPE_QUERY_RUN_ID").unwrap_or_else(|_| "default".to_string())
        })
        .as_str()
}

#[inline]
pub(crate) fn resolve_start(query_id: u64, op: &'static str, requested: usize) {
    trace!(
        target: "nodetype::query_json",
        event = "query",
        phase = "start",
        run_id = run_id(),
        query_id,
        op,
        requested
    );
}

#[inline]
pub(crate) fn resolve_end(query_id: u64, op: &'static str, all_types: usize, cache_hit: bool) {
    trace!(
        target: "nodetype::query_json",
        event = "query",
        phase = "end",
        run_id = run_id(),
        query_id,
        op,
        all_types,
        cache_hit
    );
}

#[inline]
pub(crate) fn resolve_failed(query_id: u64, op: &'static str, error: &dyn std::fmt::Display) {
    trace!(
        target: "nodetype::query_json",
        event = "query",
        phase = "error",
        run_id = run_id(),
        query_id,
        op,
        error = %error
    );
}
