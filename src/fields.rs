use serde_json::{Map, Value};

use crate::error::RecordError;

pub type Fields = Map<String, Value>;

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid(id: &str, field: &'static str, v: &Value) -> RecordError {
    RecordError::InvalidField {
        id: id.to_string(),
        field,
        found: kind(v),
    }
}

/// Trimmed text value. Numbers and booleans are rendered as text.
pub fn opt_string(id: &str, data: &Fields, field: &'static str) -> Result<Option<String>, RecordError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(v) => Err(invalid(id, field, v)),
    }
}

/// Numeric value; numeric strings are accepted, other text counts as absent.
pub fn opt_f64(id: &str, data: &Fields, field: &'static str) -> Result<Option<f64>, RecordError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64().filter(|x| x.is_finite())),
        Some(Value::String(s)) => Ok(s
            .trim()
            .trim_start_matches('₹')
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())),
        Some(v) => Err(invalid(id, field, v)),
    }
}

pub fn opt_u32(id: &str, data: &Fields, field: &'static str) -> Result<Option<u32>, RecordError> {
    Ok(opt_f64(id, data, field)?
        .filter(|x| *x >= 0.0 && *x <= f64::from(u32::MAX))
        .map(|x| x.round() as u32))
}

pub fn opt_bool(id: &str, data: &Fields, field: &'static str) -> Result<Option<bool>, RecordError> {
    match data.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::Number(n)) => Ok(n.as_i64().map(|x| x != 0)),
        Some(Value::String(s)) => Ok(match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        }),
        Some(v) => Err(invalid(id, field, v)),
    }
}

/// List of text values. A single comma-separated string is split.
pub fn string_list(id: &str, data: &Fields, field: &'static str) -> Result<Vec<String>, RecordError> {
    let mut out = Vec::new();
    match data.get(field) {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) => {
            for part in s.split(',') {
                let p = part.trim();
                if !p.is_empty() {
                    out.push(p.to_string());
                }
            }
        }
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
                    Value::String(_) | Value::Null => {}
                    // { "name": "CBC", ... } entries are common for priced test lists
                    Value::Object(obj) => {
                        if let Some(name) = obj
                            .get("name")
                            .and_then(|x| x.as_str())
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                        {
                            out.push(name.to_string());
                        }
                    }
                    other => return Err(invalid(id, field, other)),
                }
            }
        }
        Some(v) => return Err(invalid(id, field, v)),
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Fields {
        match v {
            Value::Object(m) => m,
            _ => Fields::new(),
        }
    }

    #[test]
    fn strings_are_trimmed_and_blank_is_absent() {
        let data = fields(json!({"name": "  Dr. Rao ", "blank": "   ", "num": 42}));
        assert_eq!(opt_string("d1", &data, "name").unwrap().as_deref(), Some("Dr. Rao"));
        assert_eq!(opt_string("d1", &data, "blank").unwrap(), None);
        assert_eq!(opt_string("d1", &data, "missing").unwrap(), None);
        assert_eq!(opt_string("d1", &data, "num").unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn object_in_text_field_is_rejected() {
        let data = fields(json!({"name": {"first": "A"}}));
        let err = opt_string("d1", &data, "name").unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidField {
                id: "d1".into(),
                field: "name",
                found: "object"
            }
        );
    }

    #[test]
    fn numbers_accept_numeric_strings() {
        let data = fields(json!({"a": 4.5, "b": "₹1,200", "c": "n/a", "d": [1]}));
        assert_eq!(opt_f64("x", &data, "a").unwrap(), Some(4.5));
        assert_eq!(opt_f64("x", &data, "b").unwrap(), Some(1200.0));
        assert_eq!(opt_f64("x", &data, "c").unwrap(), None);
        assert!(opt_f64("x", &data, "d").is_err());
    }

    #[test]
    fn lists_accept_arrays_objects_and_csv() {
        let data = fields(json!({
            "a": ["CBC", " ", {"name": "Lipid Profile", "price": 500}],
            "b": "Haircut, Facial ,",
        }));
        assert_eq!(string_list("x", &data, "a").unwrap(), vec!["CBC", "Lipid Profile"]);
        assert_eq!(string_list("x", &data, "b").unwrap(), vec!["Haircut", "Facial"]);
        assert!(string_list("x", &data, "missing").unwrap().is_empty());
    }

    #[test]
    fn bools_accept_common_spellings() {
        let data = fields(json!({"a": "Yes", "b": 0, "c": "maybe"}));
        assert_eq!(opt_bool("x", &data, "a").unwrap(), Some(true));
        assert_eq!(opt_bool("x", &data, "b").unwrap(), Some(false));
        assert_eq!(opt_bool("x", &data, "c").unwrap(), None);
    }
}
