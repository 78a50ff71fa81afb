use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::cell_text;

/// Field/value table of the result, followed by warnings and methodology.
pub fn render_table(value: &Value) -> String {
    let Value::Object(envelope) = value else {
        return cell_text(value);
    };
    let body = match envelope.get("result") {
        Some(Value::Object(result)) => result,
        _ => envelope,
    };

    let mut out = field_table(body);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\n\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                out.push_str(&format!("\n  - {}", w));
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\n\nMethodology: {}", meth));
    }
    out
}

fn field_table(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), cell_text(val)]);
    }
    Table::from(builder).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_renders_result_warnings_and_methodology() {
        let value = json!({
            "result": {"predicted_risk": "Unknown", "final_prediction": "Low"},
            "methodology": "reconciled",
            "warnings": ["Risk model returned code 7 which has no label; recorded as Unknown"]
        });
        let text = render_table(&value);
        assert!(text.contains("predicted_risk"));
        assert!(text.contains("Unknown"));
        assert!(text.contains("Warnings:\n  - Risk model returned code 7"));
        assert!(text.ends_with("Methodology: reconciled"));
    }

    #[test]
    fn test_object_without_result() {
        let text = render_table(&json!({"final_prediction": "Medium"}));
        assert!(text.contains("final_prediction"));
        assert!(!text.contains("Methodology"));
    }
}
