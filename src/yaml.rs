use crate::context::Node;

pub use serde_yaml::Value as YamlValue;

impl Node for YamlValue {
    fn child(&self, key: &str) -> Option<&dyn Node> {
        let members = match self {
            YamlValue::Mapping(members) => members,
            YamlValue::Tagged(tagged) => return tagged.value.child(key),
            _ => return None,
        };
        members
            .iter()
            .find(|(k, _)| match k {
                YamlValue::String(s) => s == key,
                // scalar keys match their textual form
                YamlValue::Number(n) => n.to_string() == key,
                YamlValue::Bool(b) => b.to_string() == key,
                _ => false,
            })
            .map(|(_, value)| value as &dyn Node)
    }

    fn at(&self, index: usize) -> Option<&dyn Node> {
        match self {
            YamlValue::Sequence(elements) => elements.get(index).map(|value| value as &dyn Node),
            YamlValue::Tagged(tagged) => tagged.value.at(index),
            _ => None,
        }
    }

    fn count(&self) -> Option<usize> {
        match self {
            YamlValue::Sequence(elements) => Some(elements.len()),
            YamlValue::Tagged(tagged) => tagged.value.count(),
            _ => None,
        }
    }

    fn entries(&self) -> Option<Vec<(&str, &dyn Node)>> {
        match self {
            YamlValue::Mapping(members) => Some(
                members
                    .iter()
                    .filter_map(|(key, value)| match key {
                        YamlValue::String(s) => Some((s.as_str(), value as &dyn Node)),
                        _ => None,
                    })
                    .collect(),
            ),
            YamlValue::Tagged(tagged) => tagged.value.entries(),
            _ => None,
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            YamlValue::Null => false,
            YamlValue::Bool(b) => *b,
            YamlValue::String(s) => !s.is_empty(),
            YamlValue::Sequence(elements) => !elements.is_empty(),
            YamlValue::Tagged(tagged) => tagged.value.is_truthy(),
            _ => true,
        }
    }

    fn text(&self) -> Option<String> {
        match self {
            YamlValue::String(s) => Some(s.clone()),
            YamlValue::Number(n) => Some(n.to_string()),
            YamlValue::Bool(b) => Some(b.to_string()),
            YamlValue::Null => Some(String::new()),
            YamlValue::Tagged(tagged) => tagged.value.text(),
            _ => None,
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            YamlValue::Number(n) => n.as_f64(),
            YamlValue::Tagged(tagged) => tagged.value.number(),
            _ => None,
        }
    }
}
