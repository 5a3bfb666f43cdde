//! A thin demo around the `fieldgraph` crate: loads a directive manifest and a
//! record, both as JSON, and reports the first diagnostic (if any).
//!
//! This binary exists to give the library a runnable entry point; embedders are
//! expected to call `fieldgraph` directly rather than shell out to this CLI.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;

use fieldgraph::{
    Diagnostic, DirectiveBuilder, DirectiveIndex, Evaluator, FieldValue, IgnoreToken,
    MapFieldSource, MapRecord, Name, PredicateRegistry,
};

#[derive(Debug, Parser)]
#[command(name = "fieldgraph-cli", about = "Validate a JSON record against a directive manifest")]
struct Cli {
    /// Path to a JSON object mapping field name to its directive.
    manifest: PathBuf,

    /// Path to a JSON object mapping field name to its value.
    record: PathBuf,

    /// Traversal relaxations to apply, e.g. --ignore CONFLICTS --ignore MANDATORY.
    #[arg(long = "ignore", value_name = "TOKEN")]
    ignore: Vec<String>,

    /// Restrict evaluation to directives tagged with one of these contexts.
    #[arg(long = "only-context", value_name = "TAG")]
    only_contexts: Vec<String>,

    /// Skip directives tagged with one of these contexts.
    #[arg(long = "ignore-context", value_name = "TAG")]
    ignore_contexts: Vec<String>,
}

/// JSON shape of one manifest entry. Mirrors `DirectiveBuilder`'s fields.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ManifestEntry {
    predicate: Option<String>,
    mandatory: bool,
    alternatives: Vec<String>,
    requires: Vec<String>,
    conflicts: Vec<String>,
    context: Option<String>,
}

impl ManifestEntry {
    fn into_directive(self) -> fieldgraph::Directive {
        let mut builder = DirectiveBuilder::new().mandatory(self.mandatory);
        if let Some(predicate) = self.predicate {
            builder = builder.predicate(predicate);
        }
        if let Some(context) = self.context {
            builder = builder.context(context);
        }
        builder = builder.alternatives(self.alternatives.into_iter().map(Name::new));
        builder = builder.requires(self.requires.into_iter().map(Name::new));
        builder = builder.conflicts(self.conflicts.into_iter().map(Name::new));
        builder.build()
    }
}

fn load_manifest(path: &PathBuf) -> Result<Arc<DirectiveIndex>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    let entries: indexmap::IndexMap<String, ManifestEntry> =
        serde_json::from_str(&raw).with_context(|| "manifest is not a JSON object of directives")?;

    let mut builder = DirectiveIndex::builder();
    for (name, entry) in entries {
        builder = builder.field(name, entry.into_directive());
    }
    let index = builder.build();
    index.validate().with_context(|| "manifest failed structural validation")?;
    Ok(index)
}

fn load_record(path: &PathBuf) -> Result<MapRecord> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading record {}", path.display()))?;
    let fields: indexmap::IndexMap<String, Value> =
        serde_json::from_str(&raw).with_context(|| "record is not a JSON object")?;

    let mut record = MapRecord::new();
    for (name, value) in fields {
        let value = json_to_field_value(&name, value)?;
        record = record.with(name, value);
    }
    Ok(record)
}

fn json_to_field_value(field: &str, value: Value) -> Result<FieldValue> {
    match value {
        Value::String(s) => Ok(FieldValue::Str(s)),
        Value::Bool(b) => Ok(FieldValue::Bool(b)),
        Value::Number(n) => n
            .as_f64()
            .map(FieldValue::Number)
            .with_context(|| format!("field \"{field}\" has a number out of f64 range")),
        other => anyhow::bail!("field \"{field}\" has unsupported JSON value {other}"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let directives = load_manifest(&cli.manifest)?;
    let record = load_record(&cli.record)?;

    let ignore = cli
        .ignore
        .iter()
        .map(|raw| IgnoreToken::from_str(raw).with_context(|| format!("unknown ignore token \"{raw}\"")))
        .collect::<Result<Vec<_>>>()?;

    let mut evaluator = Evaluator::new(&record, MapFieldSource, directives, Arc::new(PredicateRegistry::new()))
        .ignoring(ignore);
    if !cli.only_contexts.is_empty() {
        evaluator = evaluator.only_contexts(cli.only_contexts.iter().map(|s| Name::new(s.as_str())));
    }
    if !cli.ignore_contexts.is_empty() {
        evaluator = evaluator.ignore_contexts(cli.ignore_contexts.iter().map(|s| Name::new(s.as_str())));
    }

    match evaluator.evaluate() {
        Ok(()) => {
            println!("record is valid");
            Ok(())
        }
        Err(diagnostic) => {
            println!("invalid: {diagnostic}");
            print_cause_chain(&diagnostic);
            std::process::exit(1);
        }
    }
}

fn print_cause_chain(diagnostic: &Diagnostic) {
    if let Diagnostic::Requirements { cause: Some(cause), .. } = diagnostic {
        println!("  caused by: {cause}");
        print_cause_chain(cause);
    }
}
