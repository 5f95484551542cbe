//! Submitted form values and the user action that triggered a submission

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Flat mapping from field name to the raw string the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, replacing any previous one
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style `set`
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Raw value, including blank strings
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value if it holds at least one non-whitespace character
    pub fn value(&self, name: &str) -> Option<&str> {
        self.raw(name).filter(|v| !v.trim().is_empty())
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// True when no field holds a non-blank value
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build form data from arbitrary JSON values.
    ///
    /// Strings are kept verbatim, numbers and booleans are stringified,
    /// nulls and nested structures are dropped.
    pub fn from_json_map(values: serde_json::Map<String, serde_json::Value>) -> Self {
        let fields = values
            .into_iter()
            .filter_map(|(name, value)| match value {
                serde_json::Value::String(s) => Some((name, s)),
                serde_json::Value::Number(n) => Some((name, n.to_string())),
                serde_json::Value::Bool(b) => Some((name, b.to_string())),
                _ => None,
            })
            .collect();
        FormData(fields)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What the user did when the submission was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Save,
    Download,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Save => "save",
            Action::Download => "download",
        }
    }

    /// Wording used in the email subject line
    pub fn subject_label(&self) -> &'static str {
        match self {
            Action::Save => "Draft Saved",
            Action::Download => "Downloaded",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "save" => Ok(Action::Save),
            "download" => Ok(Action::Download),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}
