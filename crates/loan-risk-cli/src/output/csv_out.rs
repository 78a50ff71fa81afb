use serde_json::Value;
use std::io;

use super::cell_text;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV output error: {}", e);
    }
}

/// Two-column `field,value` CSV of the result object (or of the value itself).
pub fn write_csv<W: io::Write>(writer: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Object(map) => {
            wtr.write_record(["field", "value"])?;
            for (key, val) in map {
                wtr.write_record([key.as_str(), &cell_text(val)])?;
            }
        }
        other => wtr.write_record([cell_text(other)])?,
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_result_rows() {
        let value = json!({
            "result": {"loan_amount": "15000", "final_prediction": "High"},
            "warnings": []
        });
        let mut out = Vec::new();
        write_csv(&mut out, &value).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "field,value\nfinal_prediction,High\nloan_amount,15000\n"
        );
    }

    #[test]
    fn test_quotes_commas() {
        let value = json!({"result": {"note": "a, b"}});
        let mut out = Vec::new();
        write_csv(&mut out, &value).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"a, b\""));
    }
}
