//! Per-class registry: constructor cache and declared name tables.
//!
//! Existence checks (`has_method`, `has_property`, `has_signal`) look at the
//! class's own declared names first and then walk to the parent class.

use super::backend::{ConstructorHandle, Memory, ObjectId};
use super::object_handle::ObjectHandle;
use super::runtime;
use super::string_name::StringName;
use crate::classes::Object;
use crate::core::error::BindingResult;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// Static description of a wrapped engine class.
pub trait EngineClass: Sized {
    const CLASS_NAME: &'static str;
    const MEMORY: Memory;

    fn class_info() -> &'static ClassInfo;

    /// Adopts an object without checking its native class.
    fn from_object_unchecked(object: Object) -> Self;

    fn as_object(&self) -> &Object;

    fn into_object(self) -> Object;

    fn instance_id(&self) -> ObjectId {
        self.as_object().handle().id()
    }

    /// Destroys the native object; refused for reference-counted objects.
    fn free(self) {
        Object::free(self.into_object())
    }
}

/// Allocates a new native instance of `T`.
pub fn construct<T: EngineClass>() -> BindingResult<T> {
    let handle = ObjectHandle::construct(T::class_info())?;
    Ok(T::from_object_unchecked(Object::from_handle(handle)))
}

/// Interned names declared by one class (not including its ancestors).
#[derive(Debug)]
pub struct ClassNames {
    pub class: StringName,
    pub methods: HashSet<StringName>,
    pub properties: HashSet<StringName>,
    pub signals: HashSet<StringName>,
}

impl ClassNames {
    fn intern(info: &ClassInfo) -> Self {
        Self {
            class: StringName::new(info.name),
            methods: intern_set(info.methods),
            properties: intern_set(info.properties),
            signals: intern_set(info.signals),
        }
    }
}

fn intern_set(names: &[&str]) -> HashSet<StringName> {
    names.iter().map(|name| StringName::new(name)).collect()
}

pub struct ClassInfo {
    name: &'static str,
    parent: Option<fn() -> &'static ClassInfo>,
    memory: Memory,
    methods: &'static [&'static str],
    properties: &'static [&'static str],
    signals: &'static [&'static str],
    names: OnceLock<ClassNames>,
    constructor: OnceLock<Option<ConstructorHandle>>,
}

impl ClassInfo {
    pub const fn new(
        name: &'static str,
        parent: Option<fn() -> &'static ClassInfo>,
        memory: Memory,
        methods: &'static [&'static str],
        properties: &'static [&'static str],
        signals: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            parent,
            memory,
            methods,
            properties,
            signals,
            names: OnceLock::new(),
            constructor: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn memory(&self) -> Memory {
        self.memory
    }

    pub fn parent(&self) -> Option<&'static ClassInfo> {
        self.parent.map(|parent| parent())
    }

    /// Interned name tables, built on first access.
    pub fn names(&self) -> &ClassNames {
        self.names.get_or_init(|| ClassNames::intern(self))
    }

    pub fn has_method(&self, method: &StringName) -> bool {
        self.names().methods.contains(method)
            || self.parent().is_some_and(|parent| parent.has_method(method))
    }

    pub fn has_property(&self, property: &StringName) -> bool {
        self.names().properties.contains(property)
            || self.parent().is_some_and(|parent| parent.has_property(property))
    }

    pub fn has_signal(&self, signal: &StringName) -> bool {
        self.names().signals.contains(signal)
            || self.parent().is_some_and(|parent| parent.has_signal(signal))
    }

    /// True if `class` is this class or one of its ancestors.
    pub fn inherits(&self, class: &str) -> bool {
        self.name == class || self.parent().is_some_and(|parent| parent.inherits(class))
    }

    /// Constructor handle, resolved once.
    pub fn constructor(&self) -> Option<ConstructorHandle> {
        *self.constructor.get_or_init(|| {
            let constructor = runtime::backend().resolve_constructor(&self.names().class);
            if constructor.is_none() {
                tracing::error!(target: "bindings", class = self.name, "Class constructor not found");
            }
            constructor
        })
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("parent", &self.parent().map(ClassInfo::name))
            .field("memory", &self.memory)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_info() -> &'static ClassInfo {
        static BASE: ClassInfo = ClassInfo::new(
            "Base",
            None,
            Memory::Manual,
            &["base_method"],
            &["base_property"],
            &["base_signal"],
        );
        &BASE
    }

    fn derived_info() -> &'static ClassInfo {
        static DERIVED: ClassInfo = ClassInfo::new(
            "Derived",
            Some(base_info as fn() -> &'static ClassInfo),
            Memory::Manual,
            &["derived_method"],
            &[],
            &["derived_signal"],
        );
        &DERIVED
    }

    #[test]
    fn test_own_names_checked_first() {
        let info = derived_info();
        assert!(info.has_method(&StringName::new("derived_method")));
        assert!(info.has_signal(&StringName::new("derived_signal")));
    }

    #[test]
    fn test_delegates_to_parent() {
        let info = derived_info();
        assert!(info.has_method(&StringName::new("base_method")));
        assert!(info.has_property(&StringName::new("base_property")));
        assert!(info.has_signal(&StringName::new("base_signal")));
        assert!(!info.has_method(&StringName::new("missing")));
        assert!(!base_info().has_method(&StringName::new("derived_method")));
    }

    #[test]
    fn test_inherits_walks_chain() {
        assert!(derived_info().inherits("Base"));
        assert!(derived_info().inherits("Derived"));
        assert!(!base_info().inherits("Derived"));
        assert_eq!(derived_info().parent().map(ClassInfo::name), Some("Base"));
    }

    #[test]
    fn test_names_interned_once() {
        let first = derived_info().names() as *const ClassNames;
        let second = derived_info().names() as *const ClassNames;
        assert_eq!(first, second);
        assert_eq!(derived_info().names().class, "Derived");
    }
}
