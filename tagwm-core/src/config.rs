use crate::models::{Output, PropertyValue, ValueKind};
use serde::{Deserialize, Serialize};

/// Where desktop and stacking state is written.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Pure native session, nothing reads root properties.
    Native,
    /// Write EWMH properties onto the bridge root window.
    #[default]
    Bridge,
}

/// A custom property declared by the user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PropertyValue>,
}

pub trait Config {
    fn create_list_of_tag_labels(&self) -> Vec<String>;

    fn outputs(&self) -> Vec<Output>;

    fn publish_mode(&self) -> PublishMode;

    fn custom_properties(&self) -> Vec<PropertyDecl>;

    fn log_level(&self) -> String {
        "info".to_owned()
    }
}
