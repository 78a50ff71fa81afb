//! HTML views: the application form, the result page and the error page.

use axum::response::Html;

use loan_risk_core::prediction::PredictionRecord;

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn result_page(record: &PredictionRecord) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Loan Risk Result</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="card">
        <h1>Prediction Result</h1>
        <table>
            <tr><th>Predicted Risk</th><td id="predicted_risk">{risk}</td></tr>
            <tr><th>Predicted Grade</th><td id="predicted_grade">{grade}</td></tr>
            <tr><th>Final Prediction</th><td id="final_prediction" class="{class}">{final_label}</td></tr>
        </table>
        <p><a href="/">Score another application</a></p>
    </div>
</body>
</html>
"#,
        risk = record.predicted_risk,
        grade = record.predicted_grade,
        final_label = record.final_prediction,
        class = record.final_prediction.as_str().to_ascii_lowercase(),
    ))
}

pub fn error_page(title: &str, message: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="card">
        <h1>{title}</h1>
        <p class="error">{message}</p>
        <p><a href="/">Back to the form</a></p>
    </div>
</body>
</html>
"#,
        title = escape_html(title),
        message = escape_html(message),
    ))
}

/// Minimal escaping for text placed inside element bodies.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body { font-family: 'Segoe UI', Tahoma, sans-serif; background: #f5f5f5; color: #333; padding: 20px; }
        .card { max-width: 640px; margin: 0 auto; background: white; padding: 24px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        label { display: block; margin-top: 10px; font-weight: 600; }
        input { width: 100%; padding: 6px; box-sizing: border-box; }
        button { margin-top: 16px; padding: 8px 16px; }
        th { text-align: left; padding-right: 24px; }
        .high { color: #c0392b; font-weight: bold; }
        .medium { color: #d68910; font-weight: bold; }
        .low { color: #1e8449; font-weight: bold; }
        .error { color: #c0392b; }";

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Loan Risk Prediction</title>
    <style>
        body { font-family: 'Segoe UI', Tahoma, sans-serif; background: #f5f5f5; color: #333; padding: 20px; }
        .card { max-width: 640px; margin: 0 auto; background: white; padding: 24px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        label { display: block; margin-top: 10px; font-weight: 600; }
        input { width: 100%; padding: 6px; box-sizing: border-box; }
        button { margin-top: 16px; padding: 8px 16px; }
    </style>
</head>
<body>
    <div class="card">
        <h1>Loan Risk Prediction</h1>
        <form action="/predict" method="post">
            <label for="loan_amount">Loan Amount</label>
            <input type="number" step="any" id="loan_amount" name="loan_amount" required>
            <label for="employment_status">Employment Status (code)</label>
            <input type="number" step="1" id="employment_status" name="employment_status" required>
            <label for="credit_score">Credit Score</label>
            <input type="number" step="1" id="credit_score" name="credit_score" required>
            <label for="income">Income</label>
            <input type="number" step="any" id="income" name="income" required>
            <label for="debt_to_income_ratio">Debt-to-Income Ratio</label>
            <input type="number" step="any" id="debt_to_income_ratio" name="debt_to_income_ratio" required>
            <label for="age">Age</label>
            <input type="number" step="1" id="age" name="age" required>
            <label for="interest_rate">Interest Rate</label>
            <input type="number" step="any" id="interest_rate" name="interest_rate" required>
            <label for="existing_loan_balance">Existing Loan Balance</label>
            <input type="number" step="any" id="existing_loan_balance" name="existing_loan_balance" required>
            <label for="previous_default">Previous Default (0 or 1)</label>
            <input type="number" step="1" id="previous_default" name="previous_default" required>
            <label for="interest_paid">Interest Paid</label>
            <input type="number" step="any" id="interest_paid" name="interest_paid" required>
            <label for="installment">Installment</label>
            <input type="number" step="any" id="installment" name="installment" required>
            <label for="term">Term</label>
            <input type="number" step="1" id="term" name="term" required>
            <label for="principal_paid">Principal Paid</label>
            <input type="number" step="any" id="principal_paid" name="principal_paid" required>
            <label for="origination_date">Origination Date</label>
            <input type="date" id="origination_date" name="origination_date" required>
            <label for="last_payment_date">Last Payment Date</label>
            <input type="date" id="last_payment_date" name="last_payment_date" required>
            <button type="submit">Predict</button>
        </form>
    </div>
</body>
</html>
"#;
