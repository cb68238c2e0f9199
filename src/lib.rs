//! A Mustache template engine carrying the mustach extension set.
//!
//! A [Template] compiled from source is rendered against a document
//! through the [Node] seam, getting partials from a [TemplateStore].
//! Documents are usually [JsonValue] or [YamlValue] trees, but any type
//! implementing [Node] can drive a template.
//!
//! The core language follows the Mustache [`specs`]: sections, inverted
//! sections, partials with indentation, comments and delimiter changes,
//! with standalone-line trimming. On top of that, [Extensions] toggles
//! equality and relational conditions (`{{#key=value}}`, `{{#n>=10}}`),
//! JSON pointer paths (`{{/a/b/0}}`), object iteration (`{{#obj.*}}`
//! with `{{*}}` naming the current key), data-first partial lookup and
//! strict checking of undefined variables.
//!
//! Failures form the closed [Error] set; every kind carries a stable
//! numeric code through [Error::code] and [Error::from_code].
//!
//!
//! # Samples
//!
//! ## Hello world
//!
//! ```
//! use mustach::{Extensions, Template};
//!
//! let text = "hello, {{you}}!";
//! let data = r#"{
//!     "you": "world"
//! }"#;
//!
//! let template = Template::parse(text, Extensions::empty()).unwrap();
//! let document = mustach::parse_json_str(data).unwrap();
//!
//! let result = template.render(&document).unwrap();
//!
//! assert_eq!(result, "hello, world!")
//! ```
//!
//! ## Hello team
//!
//! ```
//! use mustach::{Extensions, Template, YamlValue};
//! let text = r#"
//!   {{#team}}
//!   hello, {{address}} {{name}}!
//!   {{/team}}
//! "#;
//! let data = r#"
//!   team:
//!     - name: john
//!       address: little
//!     - name: 42
//!       address: citizen
//! "#;
//!
//! let template = Template::parse(text, Extensions::empty()).unwrap();
//! let document = serde_yaml::from_str::<YamlValue>(data).unwrap();
//!
//! let result = template.render(&document).unwrap();
//! assert_eq!(result, r#"
//!   hello, little john!
//!   hello, citizen 42!
//! "#);
//! ```
//!
//! ## Extensions
//!
//! ```
//! use mustach::{Extensions, TemplateMap};
//!
//! let mut templates = TemplateMap::new(Extensions::all());
//! templates.insert("row", "{{*}}: {{.}}\n");
//! templates.insert("table", "{{#fields.*}}{{>row}}{{/fields.*}}");
//!
//! let document = mustach::parse_json_str(r#"{"fields": {"a": 1, "b": 2}}"#).unwrap();
//!
//! let result = templates.render("table", &document).unwrap();
//! assert_eq!(result, "a: 1\nb: 2\n");
//! ```
//!
//!
//! [`specs`]: https://github.com/mustache/spec
//! [Error::code]: crate::Error::code
//! [Error::from_code]: crate::Error::from_code
mod context;
mod dump;
mod error;
mod flags;
mod json;
mod path;
mod reader;
mod render;
mod template;
mod yaml;

pub use self::context::Node;
pub use self::dump::{from_value, to_json};
pub use self::error::{DocumentError, Error};
pub use self::flags::Extensions;
pub use self::json::{parse_json, parse_json_str, JsonValue};
pub use self::template::{Template, TemplateMap, TemplateStore};
pub use self::yaml::YamlValue;
