//! JSON output for the CLI
//!
//! One JSON object per line on stdout:
//! - `{"status":"ok","data":...}` on success
//! - `{"status":"error","code":...,"message":...}` on failure

use std::io::Write;

use serde_json::{json, Map, Value};

use super::errors::CliResult;
use crate::entity::Entity;

/// Write a success response
pub fn write_response(out: &mut impl Write, data: Value) -> CliResult<()> {
    let response = json!({
        "status": "ok",
        "data": data
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// Write an error response
pub fn write_error(out: &mut impl Write, code: &str, message: &str) -> CliResult<()> {
    let response = json!({
        "status": "error",
        "code": code,
        "message": message
    });

    serde_json::to_writer(&mut *out, &response)?;
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

/// `{"row":1,"type":"Person","fields":{...}}`
pub fn entity_json(entity: &Entity) -> CliResult<Value> {
    let mut fields = Map::new();
    for (name, value) in entity.iter() {
        fields.insert(name.to_string(), serde_json::to_value(value)?);
    }

    Ok(json!({
        "row": entity.row_index(),
        "type": entity.type_name(),
        "fields": fields,
    }))
}
