use serde_json::Value;

use super::cell_text;

/// Fields worth printing alone, most decisive first.
const PRIORITY_KEYS: [&str; 3] = ["final_prediction", "predicted_risk", "predicted_grade"];

/// The single most useful line of an output envelope.
pub fn minimal_line(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return cell_text(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, cell_text(val));
        }
    }
    cell_text(result)
}
