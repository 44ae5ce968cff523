use serde::{Deserialize, Serialize};

/// Identifier handed out by the layout subsystem. The engine never creates tags.
pub type TagRef = usize;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagRef,
    pub label: String,
}

impl Tag {
    #[must_use]
    pub fn new(id: TagRef, label: &str) -> Self {
        Self {
            id,
            label: label.to_owned(),
        }
    }
}
