//! Class-code label tables and the reconciliation rule.

use crate::SeverityLabel;

/// Risk model codes: 0 → Low, 1 → Medium, 2 → High, anything else → Unknown.
pub fn map_risk_label(code: i64) -> SeverityLabel {
    match code {
        0 => SeverityLabel::Low,
        1 => SeverityLabel::Medium,
        2 => SeverityLabel::High,
        _ => SeverityLabel::Unknown,
    }
}

/// Grade model codes: A → Low, B → Medium, C → High, anything else → Unknown.
///
/// Matching is exact; `"a"` and `" A"` are Unknown.
pub fn map_grade_label(code: &str) -> SeverityLabel {
    match code {
        "A" => SeverityLabel::Low,
        "B" => SeverityLabel::Medium,
        "C" => SeverityLabel::High,
        _ => SeverityLabel::Unknown,
    }
}

/// Merge the two model labels into the final severity.
///
/// Equal labels win outright, then High beats Medium beats Low. Unknown has
/// no precedence of its own: paired with anything else it falls through to
/// the other label's branch, or to Low. Unknown/Unknown stays Unknown.
pub fn reconcile(risk: SeverityLabel, grade: SeverityLabel) -> SeverityLabel {
    use SeverityLabel::*;

    if risk == grade {
        risk
    } else if risk == High || grade == High {
        High
    } else if risk == Medium || grade == Medium {
        Medium
    } else {
        Low
    }
}
