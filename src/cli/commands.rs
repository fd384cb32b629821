//! CLI command implementations
//!
//! Each invocation loads the config, opens the one table it needs and,
//! for writes, commits before returning.

use std::io::{self, Write};

use serde_json::{json, Value};

use crate::codec::{FieldCodec, FieldValue};
use crate::config::Config;
use crate::observability::{Logger, Severity};
use crate::schema::RecordSchema;
use crate::storage::{StoreRegistry, Table};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{entity_json, write_error, write_response};

/// Parses arguments, runs the command and reports failures on stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run_command(cli, &mut out) {
        Ok(()) => Ok(()),
        Err(e) => {
            write_error(&mut out, e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Runs one parsed command, writing its response to `out`
pub fn run_command(cli: Cli, out: &mut impl Write) -> CliResult<()> {
    match cli.verbose {
        0 => {}
        1 => Logger::set_min_severity(Severity::Info),
        _ => Logger::set_min_severity(Severity::Trace),
    }

    let config = Config::load(&cli.config)?;
    let mut registry = StoreRegistry::new(config.store_options());

    match cli.command {
        Command::Tables => tables(&config, out),
        Command::Count { table } => {
            let handle = open_table(&config, &mut registry, &table)?;
            write_response(out, json!({ "table": table, "count": handle.line_count() }))
        }
        Command::Get { table, row } => {
            let handle = open_table(&config, &mut registry, &table)?;
            let entity = handle
                .get(row)?
                .ok_or_else(|| CliError::not_found(&table, row))?;
            write_response(out, entity_json(&entity)?)
        }
        Command::Select { table, filters } => {
            let handle = open_table(&config, &mut registry, &table)?;
            let filters = filters
                .iter()
                .map(|f| parse_assignment(f))
                .collect::<CliResult<Vec<_>>>()?;

            let mut rows = Vec::new();
            for entity in handle.select(filters)? {
                rows.push(entity_json(&entity?)?);
            }
            write_response(out, Value::Array(rows))
        }
        Command::Insert { table, values } => {
            let handle = open_table(&config, &mut registry, &table)?;
            let values = parse_values(&handle.schema(), &values)?;
            let entity = handle.new_entity(values)?;
            handle.insert(&entity)?;
            handle.commit()?;
            write_response(out, json!({ "table": table, "inserted": handle.line_count() }))
        }
        Command::Update { table, row, values } => {
            let handle = open_table(&config, &mut registry, &table)?;
            if row == 0 || row > handle.line_count() {
                return Err(CliError::not_found(&table, row));
            }
            let values = parse_values(&handle.schema(), &values)?;
            handle.update(row, values)?;
            handle.commit()?;
            write_response(out, json!({ "table": table, "updated": row }))
        }
    }
}

fn tables(config: &Config, out: &mut impl Write) -> CliResult<()> {
    let mut listed = Vec::new();
    for name in config.tables.keys() {
        let schema = config.schema_for(name)?;
        let fields: Vec<Value> = schema
            .fields()
            .iter()
            .map(|f| json!({ "name": f.name, "type": f.codec.type_name(), "width": f.width() }))
            .collect();
        listed.push(json!({
            "name": name,
            "model": schema.name(),
            "path": config.path_for(name)?.display().to_string(),
            "width": schema.total_width(),
            "fields": fields,
        }));
    }
    write_response(out, Value::Array(listed))
}

fn open_table(config: &Config, registry: &mut StoreRegistry, name: &str) -> CliResult<Table> {
    let schema = config.schema_for(name)?;
    let path = config.path_for(name)?;
    Ok(registry.open(path, schema)?)
}

/// Splits `field=value` at the first `=`
fn parse_assignment(arg: &str) -> CliResult<(String, String)> {
    match arg.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field.to_string(), value.to_string())),
        _ => Err(CliError::usage(format!(
            "expected FIELD=VALUE, got '{}'",
            arg
        ))),
    }
}

/// Parses `field=value` arguments into typed values for `schema`
fn parse_values(schema: &RecordSchema, args: &[String]) -> CliResult<Vec<(String, FieldValue)>> {
    args.iter()
        .map(|arg| {
            let (field, raw) = parse_assignment(arg)?;
            let def = schema
                .field(&field)
                .map_err(|e| CliError::usage(e.to_string()))?;
            let value = match def.codec {
                FieldCodec::Text { .. } => FieldValue::Text(raw),
                FieldCodec::Unsigned { .. } => raw
                    .trim()
                    .parse::<i64>()
                    .map(FieldValue::Integer)
                    .map_err(|_| {
                        CliError::usage(format!(
                            "field {} expects an integer, got '{}'",
                            field, raw
                        ))
                    })?,
            };
            Ok((field, value))
        })
        .collect()
}
