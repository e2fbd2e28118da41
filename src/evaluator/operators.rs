use serde_json::Value;

use crate::flow::ConditionType;
use crate::template::value_as_text;

fn as_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Equals: textual equality, or numeric equality when both sides are numbers
/// ("42" equals 42.0).
pub fn equal(value: &str, operand: &Value) -> bool {
    let operand = value_as_text(operand);
    if value == operand {
        return true;
    }
    match (as_number(value), as_number(&operand)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

pub fn contains(value: &str, operand: &Value) -> bool {
    value.contains(value_as_text(operand).as_str())
}

/// Numeric comparison; never matches when either side is not a number.
fn compare(value: &str, operand: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    match (as_number(value), as_number(&value_as_text(operand))) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Tests `value` against the operand of an Evaluate branch.
pub fn evaluate(value: &str, operator: &ConditionType, operand: &Value) -> bool {
    match operator {
        ConditionType::Equals => equal(value, operand),
        ConditionType::Contains => contains(value, operand),
        ConditionType::GreaterThan => compare(value, operand, |a, b| a > b),
        ConditionType::GreaterThanOrEqualTo => compare(value, operand, |a, b| a >= b),
        ConditionType::LessThan => compare(value, operand, |a, b| a < b),
        ConditionType::LessThanOrEqualTo => compare(value, operand, |a, b| a <= b),
        ConditionType::Other(op) => {
            tracing::warn!(operator = %op, "unsupported branch operator never matches");
            false
        }
    }
}
