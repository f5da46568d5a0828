//! `$batch` request bodies for change sets.

use uuid::Uuid;

use super::super::Changes;
use super::super::Protocol;
use crate::model::Record;
use crate::query::odata::key_to_odata;

/// Generates a unique boundary string.
pub fn generate_boundary(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Builds a multipart batch body holding one changeset.
///
/// Operations are ordered added (POST), changed (PATCH), deleted (DELETE),
/// each with a sequential `Content-ID`. `collection_url` is the absolute URL
/// of the target entity set.
pub fn build_changeset_body(
    changes: &Changes,
    key_field: &str,
    collection_url: &str,
    protocol: Protocol,
    batch_boundary: &str,
    changeset_boundary: &str,
) -> String {
    let entity_url = |record: &Record| {
        format!("{}({})", collection_url, key_to_odata(record.get(key_field), protocol))
    };

    let mut operations: Vec<(&str, String, Option<String>)> = Vec::with_capacity(changes.len());
    for record in &changes.added {
        operations.push(("POST", collection_url.to_string(), Some(record.to_json().to_string())));
    }
    for record in &changes.changed {
        operations.push(("PATCH", entity_url(record), Some(record.to_json().to_string())));
    }
    for record in &changes.deleted {
        operations.push(("DELETE", entity_url(record), None));
    }

    let mut body = String::new();
    body.push_str(&format!("--{}\r\n", batch_boundary));
    body.push_str(&format!(
        "Content-Type: multipart/mixed; boundary={}\r\n\r\n",
        changeset_boundary
    ));

    for (id, (method, url, payload)) in operations.into_iter().enumerate() {
        body.push_str(&format!("--{}\r\n", changeset_boundary));
        body.push_str("Content-Type: application/http\r\n");
        body.push_str("Content-Transfer-Encoding: binary\r\n");
        body.push_str(&format!("Content-ID: {}\r\n\r\n", id + 1));

        body.push_str(&format!("{} {} HTTP/1.1\r\n", method, url));
        if let Some(payload) = payload {
            body.push_str("Content-Type: application/json\r\n");
            body.push_str(&format!("Content-Length: {}\r\n\r\n", payload.len()));
            body.push_str(&payload);
        }
        body.push_str("\r\n");
    }

    body.push_str(&format!("--{}--\r\n", changeset_boundary));
    body.push_str(&format!("--{}--\r\n", batch_boundary));
    body
}
