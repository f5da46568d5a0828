//! OData response parsing

use serde_json::Value as Json;

use crate::error::SourceError;
use crate::model::Record;

/// Records and optional total count of a collection response.
///
/// Accepts the v4 shape (`value` + `@odata.count`), v3 light JSON
/// (`value` + `odata.count`) and v3 verbose JSON (`d.results` + `__count`, or
/// a bare `d` array). Counts may arrive as numbers or strings.
pub fn parse_collection(json: Json) -> Result<(Vec<Record>, Option<usize>), SourceError> {
    let mut map = match json {
        Json::Object(map) => map,
        other => {
            return Err(SourceError::parse_with_body(
                "expected a JSON object",
                other.to_string(),
            ));
        }
    };

    if let Some(items) = map.remove("value") {
        let count = map
            .get("@odata.count")
            .or_else(|| map.get("odata.count"))
            .and_then(parse_count);
        return Ok((records(items)?, count));
    }

    match map.remove("d") {
        Some(Json::Array(items)) => Ok((records(Json::Array(items))?, None)),
        Some(Json::Object(mut d)) => {
            let count = d.get("__count").and_then(parse_count);
            let items = d.remove("results").ok_or_else(|| {
                SourceError::parse_with_body("missing d.results", Json::Object(d.clone()).to_string())
            })?;
            Ok((records(items)?, count))
        }
        _ => Err(SourceError::parse_with_body(
            "missing value or d in collection response",
            Json::Object(map).to_string(),
        )),
    }
}

/// A single entity, unwrapping a v3 `d` envelope.
pub fn parse_entity(json: Json) -> Result<Record, SourceError> {
    let json = match json {
        Json::Object(mut map) if map.contains_key("d") => map.remove("d").unwrap_or(Json::Null),
        other => other,
    };
    let mut record = Record::from_json(json)?;
    strip_annotations(&mut record);
    Ok(record)
}

fn records(items: Json) -> Result<Vec<Record>, SourceError> {
    let mut records = Record::many_from_json(items)?;
    records.iter_mut().for_each(strip_annotations);
    Ok(records)
}

fn strip_annotations(record: &mut Record) {
    let annotations: Vec<String> = record
        .field_names()
        .into_iter()
        .filter(|name| name.starts_with("@odata.") || name.starts_with("odata.") || *name == "__metadata")
        .map(String::from)
        .collect();
    for name in annotations {
        record.remove(&name);
    }
}

fn parse_count(value: &Json) -> Option<usize> {
    match value {
        Json::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Json::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// HTTP status codes of every operation in a `$batch` response body, in order.
pub fn parse_batch_statuses(body: &str) -> Vec<u16> {
    body.lines()
        .map(str::trim)
        .filter(|line| line.starts_with("HTTP/1.1 ") || line.starts_with("HTTP/1.0 "))
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|code| code.parse().ok())
        .collect()
}
