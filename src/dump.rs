use serde_yaml::value::TaggedValue;

use crate::error::DocumentError;
use crate::json::{parse_json_str, JsonValue};
use crate::yaml::YamlValue;

/// Serializes a host-side value to JSON text for the engine.
///
/// Mappings keep their order and scalar mapping keys serialize through
/// their textual form. Tagged values drop the tag and emit the inner
/// value as an escaped string, the way symbols serialize in host
/// bindings of the engine.
pub fn to_json(value: &YamlValue) -> String {
    let mut out = String::new();
    dump_value(&mut out, value);
    out
}

/// Serializes a host-side value and parses the result back into the
/// JSON document model, ready for [`Template::render`].
///
/// [`Template::render`]: crate::Template::render
pub fn from_value(value: &YamlValue) -> Result<JsonValue, DocumentError> {
    parse_json_str(&to_json(value))
}

fn dump_value(out: &mut String, value: &YamlValue) {
    match value {
        YamlValue::Null => out.push_str("null"),
        YamlValue::Bool(true) => out.push_str("true"),
        YamlValue::Bool(false) => out.push_str("false"),
        YamlValue::Number(n) => out.push_str(&n.to_string()),
        YamlValue::String(s) => dump_string(out, s),
        YamlValue::Sequence(elements) => {
            out.push('[');
            for (index, element) in elements.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                dump_value(out, element);
            }
            out.push(']');
        }
        YamlValue::Mapping(members) => {
            out.push('{');
            for (index, (key, value)) in members.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                dump_key(out, key);
                out.push(':');
                dump_value(out, value);
            }
            out.push('}');
        }
        YamlValue::Tagged(tagged) => dump_tagged(out, tagged),
    }
}

fn dump_key(out: &mut String, key: &YamlValue) {
    match key {
        YamlValue::String(s) => dump_string(out, s),
        YamlValue::Number(n) => dump_string(out, &n.to_string()),
        YamlValue::Bool(b) => dump_string(out, &b.to_string()),
        YamlValue::Null => dump_string(out, ""),
        other => dump_string(out, &to_json(other)),
    }
}

fn dump_tagged(out: &mut String, tagged: &TaggedValue) {
    match &tagged.value {
        YamlValue::String(s) => dump_string(out, s),
        YamlValue::Number(n) => dump_string(out, &n.to_string()),
        YamlValue::Bool(b) => dump_string(out, &b.to_string()),
        YamlValue::Null => dump_string(out, ""),
        other => dump_string(out, &to_json(other)),
    }
}

fn dump_string(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(input: &str) -> YamlValue {
        serde_yaml::from_str(input).unwrap()
    }

    #[test]
    fn scalars() {
        assert_eq!(to_json(&doc("~")), "null");
        assert_eq!(to_json(&doc("true")), "true");
        assert_eq!(to_json(&doc("42")), "42");
        assert_eq!(to_json(&doc("4.5")), "4.5");
        assert_eq!(to_json(&doc("hi")), "\"hi\"");
    }

    #[test]
    fn string_escapes() {
        let value = YamlValue::String("a\"b\\c/d\ne\tf".to_owned());
        assert_eq!(to_json(&value), r#""a\"b\\c\/d\ne\tf""#);
    }

    #[test]
    fn mapping_keeps_order_and_stringifies_keys() {
        let value = doc("b: 1\na: 2\n3: x");
        assert_eq!(to_json(&value), r#"{"b":1,"a":2,"3":"x"}"#);
    }

    #[test]
    fn sequences_nest() {
        let value = doc("- 1\n- [2, 3]\n- k: v");
        assert_eq!(to_json(&value), r#"[1,[2,3],{"k":"v"}]"#);
    }

    #[test]
    fn tagged_scalars_dump_like_symbols() {
        let value = doc("!sym foo");
        assert_eq!(to_json(&value), "\"foo\"");
    }

    #[test]
    fn round_trips_into_document_model() {
        let json = from_value(&doc("b: 1\na: two")).unwrap();
        assert_eq!(json["b"], JsonValue::from(1));
        assert_eq!(json["a"], JsonValue::from("two"));
    }
}
