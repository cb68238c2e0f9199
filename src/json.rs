use crate::context::Node;
use crate::error::DocumentError;

pub use serde_json::Value as JsonValue;

/// Parses a JSON document for rendering.
pub fn parse_json(input: &[u8]) -> Result<JsonValue, DocumentError> {
    serde_json::from_slice(input).map_err(DocumentError::from)
}

/// [`parse_json`] for text already held as a string.
pub fn parse_json_str(input: &str) -> Result<JsonValue, DocumentError> {
    serde_json::from_str(input).map_err(DocumentError::from)
}

impl Node for JsonValue {
    fn child(&self, key: &str) -> Option<&dyn Node> {
        match self {
            JsonValue::Object(members) => members.get(key).map(|value| value as &dyn Node),
            _ => None,
        }
    }

    fn at(&self, index: usize) -> Option<&dyn Node> {
        match self {
            JsonValue::Array(elements) => elements.get(index).map(|value| value as &dyn Node),
            _ => None,
        }
    }

    fn count(&self) -> Option<usize> {
        match self {
            JsonValue::Array(elements) => Some(elements.len()),
            _ => None,
        }
    }

    fn entries(&self) -> Option<Vec<(&str, &dyn Node)>> {
        match self {
            JsonValue::Object(members) => Some(
                members
                    .iter()
                    .map(|(key, value)| (key.as_str(), value as &dyn Node))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            JsonValue::Null => false,
            JsonValue::Bool(b) => *b,
            JsonValue::String(s) => !s.is_empty(),
            JsonValue::Array(elements) => !elements.is_empty(),
            _ => true,
        }
    }

    fn text(&self) -> Option<String> {
        match self {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            JsonValue::Bool(b) => Some(b.to_string()),
            JsonValue::Null => Some(String::new()),
            _ => None,
        }
    }

    fn number(&self) -> Option<f64> {
        self.as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_json(b"{\"a\": }").is_err());
        assert!(parse_json_str("[1, 2").is_err());
    }

    #[test]
    fn member_order_is_document_order() {
        let value = parse_json_str(r#"{"b": 1, "a": 2, "c": 3}"#).unwrap();
        let keys = value
            .entries()
            .unwrap()
            .into_iter()
            .map(|(key, _)| key.to_owned())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn zero_is_truthy() {
        let value = parse_json_str("0").unwrap();
        assert!(value.is_truthy());
        assert_eq!(value.text(), Some("0".to_owned()));
    }
}
