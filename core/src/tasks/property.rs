use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// A property value as a build engine hands it over.
///
/// Engines often pass lists as one `;`-separated string, so list and path
/// conversions accept both shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn into_bool(self, name: &'static str) -> Result<bool, TaskError> {
        match self {
            PropertyValue::Bool(b) => Ok(b),
            PropertyValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" | "" => Ok(false),
                _ => Err(TaskError::PropertyType {
                    name,
                    expected: "a boolean",
                }),
            },
            PropertyValue::List(_) => Err(TaskError::PropertyType {
                name,
                expected: "a boolean",
            }),
        }
    }

    pub fn into_text(self, name: &'static str) -> Result<String, TaskError> {
        match self {
            PropertyValue::Text(s) => Ok(s.trim().to_string()),
            PropertyValue::List(mut items) if items.len() <= 1 => {
                Ok(items.pop().map(|s| s.trim().to_string()).unwrap_or_default())
            }
            _ => Err(TaskError::PropertyType {
                name,
                expected: "a single string",
            }),
        }
    }

    pub fn into_list(self, name: &'static str) -> Result<Vec<String>, TaskError> {
        match self {
            PropertyValue::Text(s) => Ok(split_items(&s)),
            PropertyValue::List(items) => Ok(items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
            PropertyValue::Bool(_) => Err(TaskError::PropertyType {
                name,
                expected: "a list of strings",
            }),
        }
    }

    /// An empty string yields `None`.
    pub fn into_path(self, name: &'static str) -> Result<Option<PathBuf>, TaskError> {
        let text = self.into_text(name)?;
        Ok((!text.is_empty()).then(|| PathBuf::from(text)))
    }

    pub fn into_paths(self, name: &'static str) -> Result<Vec<PathBuf>, TaskError> {
        Ok(self
            .into_list(name)?
            .into_iter()
            .map(PathBuf::from)
            .collect())
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        PropertyValue::List(v)
    }
}

impl From<&[PathBuf]> for PropertyValue {
    fn from(v: &[PathBuf]) -> Self {
        PropertyValue::List(v.iter().map(|p| p.to_string_lossy().into_owned()).collect())
    }
}

/// Splits a `;`-separated item list, dropping blanks.
pub fn split_items(s: &str) -> Vec<String> {
    s.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicolon_strings_become_lists() {
        let v = PropertyValue::from("src/a.cpp; src/b.cpp;;");
        assert_eq!(
            v.into_paths("InputFiles").unwrap(),
            vec![PathBuf::from("src/a.cpp"), PathBuf::from("src/b.cpp")]
        );
    }

    #[test]
    fn engine_style_booleans_are_accepted() {
        assert!(PropertyValue::from("True").into_bool("Shared").unwrap());
        assert!(!PropertyValue::from("").into_bool("Shared").unwrap());
        assert!(matches!(
            PropertyValue::from("yes").into_bool("Shared"),
            Err(TaskError::PropertyType { name: "Shared", .. })
        ));
    }

    #[test]
    fn multi_item_list_is_not_a_single_string() {
        let v = PropertyValue::List(vec!["a".into(), "b".into()]);
        assert!(v.into_text("HashStyle").is_err());
        assert_eq!(
            PropertyValue::List(vec![]).into_path("OutputFile").unwrap(),
            None
        );
    }

    #[test]
    fn deserializes_untagged_from_toml() {
        #[derive(Deserialize)]
        struct Bag {
            a: PropertyValue,
            b: PropertyValue,
            c: PropertyValue,
        }
        let bag: Bag = toml::from_str("a = true\nb = \"gnu\"\nc = [\"m\", \"dl\"]").unwrap();
        assert_eq!(bag.a, PropertyValue::Bool(true));
        assert_eq!(bag.b, PropertyValue::Text("gnu".into()));
        assert_eq!(bag.c, PropertyValue::List(vec!["m".into(), "dl".into()]));
    }
}
