use crate::change_event::ChangeEvent;
use serde_json::{json, Value};

/// Largest integer magnitude a 64-bit float can hold exactly (2^53 - 1).
/// Ingestion consumers routinely parse JSON numbers into doubles, so anything
/// wider is carried as a decimal string instead.
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Renders a change event as a JSON string that survives 64-bit integers.
///
/// Total over every event shape the upstream can deliver, and deterministic:
/// the same event always encodes to the same string. Integer fields anywhere
/// in the structure (the replay position included) whose magnitude exceeds the
/// float-safe range are rendered as their exact decimal digits; everything
/// else passes through unchanged.
pub fn encode_event(event: &ChangeEvent) -> String {
    let value = json!({
        "replayId": event.replay_id,
        "payload": event.payload,
    });
    quote_wide_integers(value).to_string()
}

fn quote_wide_integers(value: Value) -> Value {
    match value {
        Value::Number(n) => {
            let wide = match (n.as_u64(), n.as_i64()) {
                (Some(u), _) => u > MAX_SAFE_INTEGER,
                (None, Some(i)) => i.unsigned_abs() > MAX_SAFE_INTEGER,
                (None, None) => false,
            };
            if wide {
                Value::String(n.to_string())
            } else {
                Value::Number(n)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(quote_wide_integers).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, field)| (key, quote_wide_integers(field)))
                .collect(),
        ),
        other => other,
    }
}
