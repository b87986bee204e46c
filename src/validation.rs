//! Request validation from declarative per-field rules.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub required: bool,
    pub email_format: bool,
    pub minimum: Option<f64>,
}

impl FieldRule {
    const fn new(kind: FieldKind) -> Self {
        FieldRule {
            kind,
            required: false,
            email_format: false,
            minimum: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn email(mut self) -> Self {
        self.email_format = true;
        self
    }

    const fn min(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }
}

/// One failed rule. Field names are `'static` because rules are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

/// Rules for POST /students: every field present and well-typed, email in
/// address format, age a positive integer.
pub const CREATE_RULES: &[(&str, FieldRule)] = &[
    ("name", FieldRule::new(FieldKind::Text).required()),
    ("email", FieldRule::new(FieldKind::Text).required().email()),
    ("age", FieldRule::new(FieldKind::Integer).required().min(1.0)),
    ("height", FieldRule::new(FieldKind::Number).required()),
    ("weight", FieldRule::new(FieldKind::Number).required()),
];

/// Rules for PUT /students/:id: same shapes, nothing required.
pub const UPDATE_RULES: &[(&str, FieldRule)] = &[
    ("name", FieldRule::new(FieldKind::Text)),
    ("email", FieldRule::new(FieldKind::Text).email()),
    ("age", FieldRule::new(FieldKind::Integer).min(1.0)),
    ("height", FieldRule::new(FieldKind::Number)),
    ("weight", FieldRule::new(FieldKind::Number)),
];

/// Check a JSON object body against a rule table. Unknown fields are ignored.
/// An explicit null for a known field is a violation: absent means
/// "unchanged", null is never a valid value here.
pub fn validate(
    body: &Map<String, Value>,
    rules: &[(&'static str, FieldRule)],
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();
    for (field, rule) in rules {
        match body.get(*field) {
            None => {
                if rule.required {
                    violations.push(Violation {
                        field,
                        message: format!("{field} is required"),
                    });
                }
            }
            Some(Value::Null) => violations.push(Violation {
                field,
                message: format!("{field} must not be null"),
            }),
            Some(v) => check_field(field, v, rule, &mut violations),
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_field(field: &'static str, v: &Value, rule: &FieldRule, out: &mut Vec<Violation>) {
    match rule.kind {
        FieldKind::Text => {
            let Some(s) = v.as_str() else {
                out.push(Violation {
                    field,
                    message: format!("{field} must be a string"),
                });
                return;
            };
            if rule.email_format && !is_email(s) {
                out.push(Violation {
                    field,
                    message: format!("{field} must be a valid email"),
                });
            }
        }
        FieldKind::Integer => {
            let Some(n) = v.as_i64() else {
                out.push(Violation {
                    field,
                    message: format!("{field} must be an integer"),
                });
                return;
            };
            if let Some(min) = rule.minimum {
                if (n as f64) < min {
                    out.push(Violation {
                        field,
                        message: format!("{field} must be at least {min}"),
                    });
                }
            }
        }
        FieldKind::Number => {
            let Some(n) = v.as_f64() else {
                out.push(Violation {
                    field,
                    message: format!("{field} must be a number"),
                });
                return;
            };
            if let Some(min) = rule.minimum {
                if n < min {
                    out.push(Violation {
                        field,
                        message: format!("{field} must be at least {min}"),
                    });
                }
            }
        }
    }
}

fn is_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
    });
    re.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn create_accepts_full_valid_body() {
        let b = body(json!({
            "name": "Ana", "email": "a@x.com", "age": 20,
            "height": 1.6, "weight": 55
        }));
        assert!(validate(&b, CREATE_RULES).is_ok());
    }

    #[test]
    fn create_rejects_missing_field() {
        let b = body(json!({
            "name": "Ana", "age": 20, "height": 1.6, "weight": 55
        }));
        let violations = validate(&b, CREATE_RULES).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "email");
    }

    #[test]
    fn create_rejects_bad_email_format() {
        let b = body(json!({
            "name": "Ana", "email": "not-an-email", "age": 20,
            "height": 1.6, "weight": 55
        }));
        assert!(validate(&b, CREATE_RULES).is_err());
    }

    #[test]
    fn create_rejects_wrong_types() {
        let b = body(json!({
            "name": 3, "email": "a@x.com", "age": "twenty",
            "height": 1.6, "weight": 55
        }));
        let violations = validate(&b, CREATE_RULES).unwrap_err();
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["name", "age"]);
    }

    #[test]
    fn update_allows_sparse_body() {
        let b = body(json!({"weight": 60.5}));
        assert!(validate(&b, UPDATE_RULES).is_ok());
    }

    #[test]
    fn update_rejects_age_below_one() {
        let b = body(json!({"age": 0}));
        let violations = validate(&b, UPDATE_RULES).unwrap_err();
        assert_eq!(violations[0].field, "age");
    }

    #[test]
    fn update_rejects_explicit_null() {
        let b = body(json!({"email": null}));
        assert!(validate(&b, UPDATE_RULES).is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let b = body(json!({"nickname": "An"}));
        assert!(validate(&b, UPDATE_RULES).is_ok());
    }

    #[test]
    fn fractional_age_is_not_an_integer() {
        let b = body(json!({"age": 20.5}));
        assert!(validate(&b, UPDATE_RULES).is_err());
    }
}
