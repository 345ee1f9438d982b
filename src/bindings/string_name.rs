//! Interned string identifiers.
//!
//! `StringName` is the key type of the engine's reflection tables (class,
//! method, property and signal names). Every distinct text is interned once
//! per process, so equality is a pointer comparison.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

static INTERNER: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();

fn intern(text: &str) -> Arc<str> {
    let table = INTERNER.get_or_init(|| Mutex::new(HashSet::new()));
    let mut table = table.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(existing) = table.get(text) {
        return Arc::clone(existing);
    }
    let interned: Arc<str> = Arc::from(text);
    table.insert(Arc::clone(&interned));
    interned
}

/// Interned engine identifier
#[derive(Clone)]
pub struct StringName(Arc<str>);

impl StringName {
    pub fn new(text: &str) -> Self {
        Self(intern(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for StringName {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for StringName {}

impl Hash for StringName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialEq<str> for StringName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for StringName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Default for StringName {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for StringName {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for StringName {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl From<&StringName> for StringName {
    fn from(name: &StringName) -> Self {
        name.clone()
    }
}

impl AsRef<str> for StringName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{:?}", &*self.0)
    }
}

impl fmt::Display for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for StringName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StringName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(StringName::new(&text))
    }
}

/// A name slot usable in `static` items, interned on first access.
///
/// ```ignore
/// static FINISHED: StaticName = StaticName::new("finished");
/// player.connect(FINISHED.get(), &callable, ConnectFlags::empty());
/// ```
pub struct StaticName {
    text: &'static str,
    name: OnceLock<StringName>,
}

impl StaticName {
    pub const fn new(text: &'static str) -> Self {
        Self {
            text,
            name: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &StringName {
        self.name.get_or_init(|| StringName::new(self.text))
    }

    pub fn as_str(&self) -> &'static str {
        self.text
    }
}

impl fmt::Debug for StaticName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticName").field(&self.text).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interned_names_share_storage() {
        let a = StringName::new("surface_get_primitive_type");
        let b = StringName::from(String::from("surface_get_primitive_type"));
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn test_distinct_names_differ() {
        assert_ne!(StringName::new("play"), StringName::new("stop"));
        assert_eq!(StringName::new("play"), "play");
    }

    #[test]
    fn test_static_name_resolves_once() {
        static READY: StaticName = StaticName::new("ready");
        let first = READY.get() as *const StringName;
        let second = READY.get() as *const StringName;
        assert_eq!(first, second);
        assert_eq!(READY.get(), &StringName::new("ready"));
    }

    #[test]
    fn test_serde_as_plain_string() {
        let name = StringName::new("Master");
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"Master\"");
        let back: StringName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }
}
