//! CLI command implementations
//!
//! Each command resolves its configuration, runs one catalog operation
//! and writes a single JSON response to stdout.

use serde_json::{json, Value};

use crate::catalog::{export_to_csv, state_extremes, Catalog};
use crate::config::Config;
use crate::index::read_index;
use crate::observability::Logger;
use crate::store::{HeaderLayout, StoreReader};

use super::args::{Command, PathArgs};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. Failures
/// are written to stdout as an error response and returned.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    let result = run_command(cli.command);

    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Build { paths } => build(&prepare(&paths)?),
        Command::Lookup { paths, keys } => lookup(&prepare(&paths)?, &keys),
        Command::Export { paths, output } => export(&prepare(&paths)?, &output),
        Command::Extremes { paths } => extremes(&prepare(&paths)?),
        Command::Info { paths } => info(&prepare(&paths)?),
    }
}

/// Resolves the config and applies its log threshold process-wide.
fn prepare(paths: &PathArgs) -> CliResult<Config> {
    let config = resolve_config(paths)?;
    Logger::set_min_severity(config.log_severity());
    Ok(config)
}

/// Loads the config file if one was given, then applies flag overrides.
pub fn resolve_config(paths: &PathArgs) -> CliResult<Config> {
    let mut config = match &paths.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(source) = &paths.source {
        config.source_path = Some(source.clone());
    }
    if let Some(store) = &paths.store {
        config.store_path = store.clone();
    }
    if let Some(index) = &paths.index {
        config.index_path = index.clone();
    }
    if let Some(level) = &paths.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;

    Ok(config)
}

/// Convert the source dataset into a store and index
pub fn build(config: &Config) -> CliResult<()> {
    if config.source_path.is_none() {
        return Err(CliError::config_error(
            "No source dataset: set source_path or pass --source",
        ));
    }

    let report = Catalog::rebuild(config)?;
    write_response(serde_json::to_value(report)?)
}

/// Look up keys, reporting found and missing keys alike
pub fn lookup(config: &Config, keys: &[String]) -> CliResult<()> {
    let mut catalog = Catalog::open(config)?;
    let results = catalog.lookup_many(keys)?;

    let results: Vec<Value> = results
        .into_iter()
        .map(|(key, record)| {
            json!({
                "key": key,
                "found": record.is_some(),
                "record": record,
            })
        })
        .collect();

    write_response(json!({ "results": results }))
}

/// Export the store to CSV
pub fn export(config: &Config, output: &std::path::Path) -> CliResult<()> {
    let report = export_to_csv(&config.store_path, output)?;
    write_response(serde_json::to_value(report)?)
}

/// Per-state extremes report
pub fn extremes(config: &Config) -> CliResult<()> {
    let report = state_extremes(&config.store_path)?;
    write_response(serde_json::to_value(report)?)
}

/// Store header and index summary, without rebuilding anything
pub fn info(config: &Config) -> CliResult<()> {
    let reader = StoreReader::open(&config.store_path)?;
    let header = reader.header();

    let schema = match &header.layout {
        HeaderLayout::Minimal => Value::Null,
        HeaderLayout::Schema(schema) => json!({
            "index_file_name": schema.index_file_name,
            "primary_key_field_index": schema.primary_key_field_index,
            "fields": schema
                .fields
                .iter()
                .map(|f| json!({ "name": f.name, "type": f.field_type.as_str() }))
                .collect::<Vec<_>>(),
        }),
    };

    let index = match read_index(&config.index_path) {
        Ok(index) => json!({ "status": "loaded", "entries": index.len() }),
        Err(e) if e.is_not_found() => json!({ "status": "missing" }),
        Err(e) => json!({ "status": "invalid", "error": e.to_string() }),
    };

    write_response(json!({
        "store": config.store_path.display().to_string(),
        "version": header.version(),
        "record_count": header.record_count,
        "creation_date": header.creation_date,
        "data_start": reader.data_start(),
        "file_size": reader.file_size(),
        "schema": schema,
        "index": index,
    }))
}
