//! Named properties declared at runtime by the configuration/scripting
//! layer. The table only grows.
use crate::bridge::{AtomId, RawProperty};
use crate::errors::{CoreError, Result};
use crate::models::{PropertyValue, ValueKind};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub name: String,
    pub backend_id: AtomId,
    pub kind: ValueKind,
    pub value: Option<PropertyValue>,
}

#[derive(Debug, Default)]
pub struct PropertyRegistry {
    entries: BTreeMap<String, PropertyEntry>,
    by_backend: HashMap<AtomId, String>,
}

impl PropertyRegistry {
    /// # Errors
    ///
    /// `DuplicateName` if `name` is already registered.
    pub fn register(&mut self, name: &str, backend_id: AtomId, kind: ValueKind) -> Result<()> {
        if self.entries.contains_key(name) {
            return Err(CoreError::DuplicateName(name.to_owned()));
        }
        tracing::debug!("Registered custom property {} ({})", name, kind);
        self.entries.insert(
            name.to_owned(),
            PropertyEntry {
                name: name.to_owned(),
                backend_id,
                kind,
                value: None,
            },
        );
        self.by_backend.insert(backend_id, name.to_owned());
        Ok(())
    }

    /// The current value, `None` while nothing was ever set.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` if `name` is not registered.
    pub fn get(&self, name: &str) -> Result<Option<PropertyValue>> {
        Ok(self.entry(name)?.value.clone())
    }

    /// # Errors
    ///
    /// `UnknownProperty` if `name` is not registered, `TypeMismatch` if
    /// `value` is not of the registered kind.
    pub fn set(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| CoreError::UnknownProperty(name.to_owned()))?;
        if entry.kind != value.kind() {
            return Err(CoreError::TypeMismatch {
                name: name.to_owned(),
                expected: entry.kind,
                found: value.kind(),
            });
        }
        entry.value = Some(value);
        Ok(())
    }

    /// # Errors
    ///
    /// `UnknownProperty` if `name` is not registered.
    pub fn entry(&self, name: &str) -> Result<&PropertyEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| CoreError::UnknownProperty(name.to_owned()))
    }

    /// Name of the property registered under `atom`.
    #[must_use]
    pub fn lookup_backend(&self, atom: AtomId) -> Option<&str> {
        self.by_backend.get(&atom).map(String::as_str)
    }

    /// Stores a value that arrived through the bridge. A deleted property
    /// clears the value.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` if `name` is not registered, `TypeMismatch` if the
    /// payload cannot be read as the registered kind.
    pub fn set_raw(&mut self, name: &str, raw: &RawProperty) -> Result<()> {
        let kind = self.entry(name)?.kind;
        if *raw == RawProperty::Deleted {
            if let Some(entry) = self.entries.get_mut(name) {
                entry.value = None;
            }
            return Ok(());
        }
        let value = from_raw(kind, raw).ok_or_else(|| CoreError::TypeMismatch {
            name: name.to_owned(),
            expected: kind,
            found: raw_kind(raw),
        })?;
        self.set(name, value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyEntry> {
        self.entries.values()
    }
}

fn from_raw(kind: ValueKind, raw: &RawProperty) -> Option<PropertyValue> {
    match kind {
        ValueKind::String => raw.as_text().map(|text| PropertyValue::String(text.to_owned())),
        ValueKind::Number => raw
            .as_cardinals()
            .and_then(<[u32]>::first)
            .map(|&n| PropertyValue::Number(f64::from(n))),
        ValueKind::Boolean => raw
            .as_cardinals()
            .and_then(<[u32]>::first)
            .map(|&n| PropertyValue::Boolean(n != 0)),
    }
}

fn raw_kind(raw: &RawProperty) -> ValueKind {
    if raw.as_text().is_some() {
        ValueKind::String
    } else {
        ValueKind::Number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_a_name_twice_fails() {
        let mut registry = PropertyRegistry::default();
        registry.register("gap", AtomId(100), ValueKind::Number).unwrap();
        assert!(matches!(
            registry.register("gap", AtomId(101), ValueKind::String),
            Err(CoreError::DuplicateName(name)) if name == "gap"
        ));
    }

    #[test]
    fn unknown_names_are_reported() {
        let mut registry = PropertyRegistry::default();
        assert!(matches!(
            registry.get("nope"),
            Err(CoreError::UnknownProperty(_))
        ));
        assert!(matches!(
            registry.set("nope", PropertyValue::Boolean(true)),
            Err(CoreError::UnknownProperty(_))
        ));
    }

    #[test]
    fn values_must_match_the_declared_kind() {
        let mut registry = PropertyRegistry::default();
        registry.register("smart_gaps", AtomId(100), ValueKind::Boolean).unwrap();
        let err = registry
            .set("smart_gaps", PropertyValue::String("yes".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::TypeMismatch {
                expected: ValueKind::Boolean,
                found: ValueKind::String,
                ..
            }
        ));
        assert_eq!(registry.get("smart_gaps").unwrap(), None);
        registry.set("smart_gaps", PropertyValue::Boolean(true)).unwrap();
        assert_eq!(
            registry.get("smart_gaps").unwrap(),
            Some(PropertyValue::Boolean(true))
        );
    }

    #[test]
    fn raw_values_are_read_as_the_declared_kind() {
        let mut registry = PropertyRegistry::default();
        registry.register("_TAGWM_GAP", AtomId(100), ValueKind::Number).unwrap();
        assert_eq!(registry.lookup_backend(AtomId(100)), Some("_TAGWM_GAP"));
        registry
            .set_raw("_TAGWM_GAP", &RawProperty::Cardinals(vec![8]))
            .unwrap();
        assert_eq!(
            registry.get("_TAGWM_GAP").unwrap(),
            Some(PropertyValue::Number(8.0))
        );
        assert!(registry
            .set_raw("_TAGWM_GAP", &RawProperty::Text("wide".into()))
            .is_err());
        registry.set_raw("_TAGWM_GAP", &RawProperty::Deleted).unwrap();
        assert_eq!(registry.get("_TAGWM_GAP").unwrap(), None);
    }
}
