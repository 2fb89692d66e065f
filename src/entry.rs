//! # Entry
//! A single submitted message and the id-keyed map it is stored in.
//!
//! All fields are plain strings and are omitted from JSON when empty, so an
//! unsaved entry serializes without `id`/`created`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persistent-log shape: entry id → entry. Ordered so the file is stable on disk.
pub type EntryMap = BTreeMap<String, Entry>;

/// A submitted message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Assigned by the store on save; empty until then.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// RFC 3339 timestamp assigned by the store on save.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ip_addr: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
}

impl Entry {
    /// New unsaved entry with author and content only.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Attach request provenance before saving.
    pub fn with_provenance(mut self, ip_addr: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_addr = ip_addr.into();
        self.user_agent = user_agent.into();
        self
    }

    /// True once the store has assigned an id.
    pub fn is_saved(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_omitted() {
        let e = Entry::new("anna", "hej");
        let v = serde_json::to_value(&e).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["author"], "anna");
        assert!(obj.get("id").is_none());
        assert!(obj.get("created").is_none());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let e: Entry = serde_json::from_str(r#"{"id":"x","content":"c"}"#).unwrap();
        assert_eq!(e.id, "x");
        assert!(e.author.is_empty());
        assert!(e.user_agent.is_empty());
        assert!(e.is_saved());
    }
}
