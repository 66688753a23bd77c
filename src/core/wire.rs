use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::{AlpacaError, Page};

#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

fn parse_envelope(body: &str, key: &str) -> Result<(Value, Option<String>), AlpacaError> {
    let mut raw: RawPage = serde_json::from_str(body)
        .map_err(|e| AlpacaError::Protocol(format!("json parse error: {e}")))?;
    let value = raw
        .rest
        .remove(key)
        .ok_or_else(|| AlpacaError::Protocol(format!("missing `{key}` in response")))?;
    Ok((value, raw.next_page_token))
}

fn records_from<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, AlpacaError> {
    match value {
        Value::Null => Ok(Vec::new()),
        v @ Value::Array(_) => serde_json::from_value(v)
            .map_err(|e| AlpacaError::Protocol(format!("malformed `{key}` record: {e}"))),
        other => Err(AlpacaError::Protocol(format!(
            "expected an array under `{key}`, got {}",
            type_name(&other)
        ))),
    }
}

/// Decodes `{ "<key>": [..] | null, "next_page_token": ".." }`.
pub(crate) fn decode_single<T: DeserializeOwned>(
    body: &str,
    key: &str,
) -> Result<Page<T>, AlpacaError> {
    let (value, next_page_token) = parse_envelope(body, key)?;
    Ok(Page {
        records: records_from(value, key)?,
        next_page_token,
    })
}

/// Decodes `{ "<key>": { "<symbol>": [..], .. } | null, "next_page_token": ".." }`
/// into `(symbol, record)` pairs, keeping each symbol's records in server order.
pub(crate) fn decode_multi<T: DeserializeOwned>(
    body: &str,
    key: &str,
) -> Result<Page<(String, T)>, AlpacaError> {
    let (value, next_page_token) = parse_envelope(body, key)?;
    let by_symbol = match value {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(AlpacaError::Protocol(format!(
                "expected an object keyed by symbol under `{key}`, got {}",
                type_name(&other)
            )));
        }
    };

    let mut records = Vec::new();
    for (symbol, value) in by_symbol {
        let rows: Vec<T> = records_from(value, key)?;
        records.extend(rows.into_iter().map(|r| (symbol.clone(), r)));
    }
    Ok(Page {
        records,
        next_page_token,
    })
}

const fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
