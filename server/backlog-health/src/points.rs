//! Typed accessors for deployment-specific custom fields.
//!
//! Concrete field ids vary per tracker deployment, so every "stringly-typed"
//! field read goes through this one seam instead of being scattered through
//! the scorers.

use serde_json::Value;

use crate::types::Issue;

/// T-shirt label to story-point lookup.
const TSHIRT_POINTS: &[(&str, f64)] = &[
  ("xs", 1.0),
  ("s", 2.0),
  ("m", 5.0),
  ("l", 8.0),
  ("xl", 13.0),
  ("xxl", 21.0),
];

/// Raw custom-field value, with JSON null treated as absent.
pub fn custom_field<'a>(issue: &'a Issue, field_id: &str) -> Option<&'a Value> {
  issue.custom.get(field_id).filter(|v| !v.is_null())
}

/// Whether a custom field is populated with a meaningful value. Empty
/// strings, empty arrays, `false`, and zero all count as absent.
pub fn has_custom_field(issue: &Issue, field_id: &str) -> bool {
  match custom_field(issue, field_id) {
    None => false,
    Some(Value::String(s)) => !s.is_empty(),
    Some(Value::Array(a)) => !a.is_empty(),
    Some(Value::Bool(b)) => *b,
    Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
    Some(_) => true,
  }
}

/// Resolve an issue's estimate: a plain number is used as-is, a T-shirt label
/// (bare string or `{"value": …}` select-option object) goes through the
/// lookup table, and anything unparseable resolves to 0.
pub fn estimate(issue: &Issue, field_id: &str) -> f64 {
  match custom_field(issue, field_id) {
    Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
    other => tshirt_points(other),
  }
}

fn tshirt_points(value: Option<&Value>) -> f64 {
  let label = match value {
    Some(Value::String(s)) => Some(s.as_str()),
    Some(Value::Object(o)) => o.get("value").and_then(Value::as_str),
    _ => None,
  };
  let label = match label {
    Some(l) => l.trim().to_ascii_lowercase(),
    None => return 0.0,
  };
  TSHIRT_POINTS
    .iter()
    .find(|(name, _)| *name == label)
    .map(|(_, pts)| *pts)
    .unwrap_or(0.0)
}
