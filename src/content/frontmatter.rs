//! Front-matter parsing
//!
//! Posts may start with a YAML block delimited by `---` lines. A block that
//! isn't a YAML mapping is left in the body (it is a pair of horizontal rules).

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

lazy_static! {
    static ref BLOCK_RE: Regex =
        Regex::new(r"^\u{feff}?---[ \t]*\r?\n(?:([\s\S]*?)\r?\n)?---[ \t]*(?:\r?\n|$)").unwrap();
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<serde_yaml::Value>()? {
                if let Some(item) = value_to_string(item) {
                    vec.push(item);
                }
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Any scalar as text, so `title: 2024` still reads as a title
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(serde_yaml::Value::deserialize(deserializer)?))
}

fn value_to_string(value: serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;

    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Sequence(items) => Some(
            items
                .into_iter()
                .filter_map(value_to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Tagged(tagged) => value_to_string(tagged.value),
        other @ Value::Mapping(_) => serde_yaml::to_string(&other)
            .ok()
            .map(|s| s.trim_end().to_string()),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontMatter {
    #[serde(deserialize_with = "scalar_string")]
    title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    date: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    excerpt: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    description: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    category: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    categories: Vec<String>,
    #[serde(deserialize_with = "string_or_vec")]
    tags: Vec<String>,
    #[serde(flatten)]
    extra: IndexMap<String, serde_yaml::Value>,
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub excerpt: Option<String>,

    /// Additional fields, in file order
    pub extra: IndexMap<String, String>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> (Self, &str) {
        let Some(caps) = BLOCK_RE.captures(content) else {
            return (FrontMatter::default(), content);
        };

        let block = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let body = content[end..].trim_start_matches(['\n', '\r']);

        if block.trim().is_empty() {
            return (FrontMatter::default(), body);
        }

        match serde_yaml::from_str::<RawFrontMatter>(block) {
            Ok(raw) => (raw.into(), body),
            Err(e) => {
                // A markdown horizontal rule, not front-matter
                tracing::debug!("Not treating block as front-matter: {}", e);
                (FrontMatter::default(), content)
            }
        }
    }
}

impl From<RawFrontMatter> for FrontMatter {
    fn from(raw: RawFrontMatter) -> Self {
        let extra = raw
            .extra
            .into_iter()
            .filter_map(|(key, value)| value_to_string(value).map(|v| (key, v)))
            .collect();

        FrontMatter {
            title: raw.title,
            date: raw.date,
            category: raw.category.or_else(|| raw.categories.into_iter().next()),
            tags: raw.tags,
            excerpt: raw.excerpt.or(raw.description),
            extra,
        }
    }
}
