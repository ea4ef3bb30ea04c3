use anyhow::{Context, Result, bail};
use nodetype_common::{NameInterner, NodeTypeDefinition};
use nodetype_solver::{DeclarationStore, NodeTypeResolver};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::cli::args::{CliArgs, OutputFormat};
use crate::cli::report::{EffectiveTypeReport, InvalidationReport, ResolveReport, RunReport};

/// Load the declaration file into a fresh store, interning every name.
pub fn load_declarations(path: &Path, interner: &NameInterner) -> Result<DeclarationStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read declarations from {}", path.display()))?;
    let declarations: Vec<NodeTypeDefinition> = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse declarations in {}", path.display()))?;

    let store = DeclarationStore::new();
    for decl in declarations {
        if store.register(decl.interned(interner)).is_some() {
            bail!("node type '{}' is declared twice", decl.name);
        }
    }
    info!(count = store.len(), path = %path.display(), "loaded declarations");
    Ok(store)
}

/// Resolve, invalidate and dump as requested by `args`.
///
/// Request names come from the same `interner` as the loaded declarations.
pub fn execute(args: &CliArgs, store: DeclarationStore, interner: &NameInterner) -> RunReport {
    let resolver = NodeTypeResolver::new(store);
    let mut report = RunReport::default();

    for request in args.resolve_requests() {
        let names: Vec<_> = request.iter().map(|name| interner.intern(name)).collect();
        let resolved = resolver.resolve(&names);
        report.resolutions.push(match resolved {
            Ok(ent) => ResolveReport {
                request: names,
                effective: Some(EffectiveTypeReport::from(ent.as_ref())),
                error: None,
            },
            Err(err) => {
                debug!(error = %err, "resolution failed");
                ResolveReport {
                    request: names,
                    effective: None,
                    error: Some(err.to_string()),
                }
            }
        });
    }

    for name in &args.invalidate {
        let name = interner.intern(name);
        let evicted = resolver.invalidate(&name);
        report
            .invalidations
            .push(InvalidationReport { name, evicted });
    }

    if args.dump {
        let mut dump = String::new();
        // Writing into a String never fails.
        let _ = resolver.dump(&mut dump);
        report.cache = Some(dump);
    }
    report
}

pub fn write_report(report: &RunReport, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report).context("failed to write report")?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for resolution in &report.resolutions {
                write!(out, "{resolution}")?;
            }
            for invalidation in &report.invalidations {
                writeln!(out, "{invalidation}")?;
            }
            if let Some(cache) = &report.cache {
                write!(out, "{cache}")?;
            }
        }
    }
    Ok(())
}

/// Run one invocation, writing the report to `out`.
///
/// Fails after writing the report if any resolution failed.
pub fn run(args: &CliArgs, out: &mut dyn Write) -> Result<()> {
    let interner = NameInterner::new();
    interner.intern_builtins();

    let store = load_declarations(&args.declarations, &interner)?;
    let report = execute(args, store, &interner);
    write_report(&report, args.format, out)?;

    let failures = report.failures();
    if failures > 0 {
        bail!(
            "{failures} of {} resolutions failed",
            report.resolutions.len()
        );
    }
    Ok(())
}
