//! The five per-user resource kinds and how each is addressed on every backend.

use std::fmt;

use serde_json::Value;

use crate::constants::KEY_PREFIX;

/// A per-user JSON-array collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Article read log
    Log,
    /// Custom links
    UserLinks,
    /// Named link lists
    LinkLists,
    /// Filter presets
    Presets,
    /// Currently-reading items
    CurrentlyReading,
}

impl Resource {
    /// Every resource kind, in a stable order.
    pub const ALL: [Resource; 5] = [
        Resource::Log,
        Resource::UserLinks,
        Resource::LinkLists,
        Resource::Presets,
        Resource::CurrentlyReading,
    ];

    /// Public name, as used in API paths.
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Log => "log",
            Resource::UserLinks => "user-links",
            Resource::LinkLists => "link-lists",
            Resource::Presets => "presets",
            Resource::CurrentlyReading => "currently-reading",
        }
    }

    /// Segment of the remote key, `wiki:<segment>:<username>`.
    ///
    /// `UserLinks` is stored under `links`; existing data depends on it.
    pub fn key_segment(&self) -> &'static str {
        match self {
            Resource::Log => "log",
            Resource::UserLinks => "links",
            Resource::LinkLists => "link_lists",
            Resource::Presets => "presets",
            Resource::CurrentlyReading => "currently_reading",
        }
    }

    /// Subdirectory of the file backend holding one `<username>.json` per user.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Resource::Log => "logs",
            Resource::UserLinks => "links",
            Resource::LinkLists => "link_lists",
            Resource::Presets => "presets",
            Resource::CurrentlyReading => "currently_reading",
        }
    }

    /// Remote string key holding this resource for `username`.
    pub fn key(&self, username: &str) -> String {
        format!("{KEY_PREFIX}:{}:{username}", self.key_segment())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decodes a stored resource value.
///
/// Missing, empty, unparsable and non-array values all decode to an empty list.
pub(crate) fn decode_list(raw: Option<&str>, key: &str) -> Vec<Value> {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            tracing::debug!("Ignoring non-list value stored at {key}: {}", type_name(&other));
            Vec::new()
        }
        Err(e) => {
            tracing::debug!("Ignoring corrupt JSON stored at {key}: {e}");
            Vec::new()
        }
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
