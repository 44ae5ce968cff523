use super::Xyhw;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OutputId(pub u32);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output#{}", self.0)
    }
}

/// A physical or logical output and its position in the global layout space.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub id: OutputId,
    pub name: String,
    pub bbox: Xyhw,
}

impl Output {
    #[must_use]
    pub fn new(id: OutputId, name: &str, bbox: Xyhw) -> Self {
        Self {
            id,
            name: name.to_owned(),
            bbox,
        }
    }
}
