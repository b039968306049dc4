//! Backend Wire Protocol
//!
//! Method names, the gateway-side view of backend objects, and conversions
//! between protobuf well-known types and JSON.
//!
//! Calls are unary gRPC requests against the `anytype.ClientCommands`
//! service (see `proto/anytype/client_commands.proto`). Object details travel
//! as `google.protobuf.Struct` and are handled as JSON maps inside the
//! gateway. Every response carries an `error` message; a non-zero `code`
//! means the backend rejected the call.

use super::pb;

use prost_types::value::Kind;
use serde_json::{Map, Number, Value};

// --- Backend Methods ---

/// Returns the backend build version. Needs no session, so it doubles as a liveness probe.
pub const METHOD_APP_GET_VERSION: &str = "AppGetVersion";
pub const METHOD_OBJECT_SEARCH: &str = "ObjectSearch";
pub const METHOD_OBJECT_CREATE: &str = "ObjectCreate";
pub const METHOD_OBJECT_OPEN: &str = "ObjectOpen";
pub const METHOD_OBJECT_SET_DETAILS: &str = "ObjectSetDetails";
pub const METHOD_OBJECT_LIST_DELETE: &str = "ObjectListDelete";
pub const METHOD_WORKSPACE_GET_ALL: &str = "WorkspaceGetAll";

/// Detail key under which search records carry their object id.
pub const DETAIL_ID: &str = "id";

/// Object details as the backend stores them: relation key to JSON value.
pub type Details = Map<String, Value>;

/// A backend object as returned by search and open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRecord {
    pub object_id: String,
    pub details: Details,
}

impl ObjectRecord {
    /// Builds a record from a search result, taking the id from its details.
    pub fn from_search_record(record: prost_types::Struct) -> Self {
        let details = details_from_struct(record);
        let object_id = details
            .get(DETAIL_ID)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self { object_id, details }
    }
}

/// Search filter forwarded to the backend. `condition` is the backend's
/// numeric condition code.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilter {
    pub relation_key: String,
    pub condition: i32,
    pub value: Value,
}

impl From<SearchFilter> for pb::SearchFilter {
    fn from(filter: SearchFilter) -> Self {
        pb::SearchFilter {
            relation_key: filter.relation_key,
            condition: filter.condition,
            value: Some(value_from_json(&filter.value)),
        }
    }
}

// --- Conversions ---

pub fn details_from_struct(details: prost_types::Struct) -> Details {
    details
        .fields
        .into_iter()
        .map(|(key, value)| (key, json_from_value(value)))
        .collect()
}

pub fn struct_from_details(details: &Details) -> prost_types::Struct {
    prost_types::Struct {
        fields: details
            .iter()
            .map(|(key, value)| (key.clone(), value_from_json(value)))
            .collect(),
    }
}

pub fn json_from_value(value: prost_types::Value) -> Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::NumberValue(n)) => json_number(n),
        Some(Kind::StructValue(s)) => Value::Object(details_from_struct(s)),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(json_from_value).collect())
        }
    }
}

pub fn value_from_json(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(*b),
        Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or_default()),
        Value::String(s) => Kind::StringValue(s.clone()),
        Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.iter().map(value_from_json).collect(),
        }),
        Value::Object(map) => Kind::StructValue(struct_from_details(map)),
    };
    prost_types::Value { kind: Some(kind) }
}

// Protobuf numbers are doubles. Whole values inside the exact-integer range
// come back as JSON integers so timestamps keep their integer form.
fn json_number(n: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Flattens details into the string assignments `ObjectSetDetails` expects.
pub fn detail_assignments(details: &Details) -> Vec<pb::DetailAssignment> {
    details
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            pb::DetailAssignment {
                key: key.clone(),
                value: Some(prost_types::Value {
                    kind: Some(Kind::StringValue(text)),
                }),
            }
        })
        .collect()
}
