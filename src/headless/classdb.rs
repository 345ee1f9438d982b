//! Class database of the headless engine.
//!
//! Classes register their methods with the same compatibility hashes the
//! wrappers are generated with. Resolution walks the parent chain, so a
//! method declared on `Node` also resolves when looked up through `Node2D`.

use super::HeadlessEngine;
use crate::bindings::backend::{MethodHandle, ObjectId};
use crate::bindings::variant::Variant;
use std::collections::HashMap;

pub type InstanceFn = fn(&HeadlessEngine, ObjectId, &[Variant]) -> Variant;
pub type StaticFn = fn(&HeadlessEngine, &[Variant]) -> Variant;

/// 方法实现
#[derive(Clone, Copy)]
pub enum MethodBody {
    /// 读取属性存储
    Getter(&'static str),
    /// 写入属性存储
    Setter(&'static str),
    Instance(InstanceFn),
    Static(StaticFn),
}

pub struct MethodDef {
    pub name: &'static str,
    pub hash: u32,
    pub body: MethodBody,
}

pub struct PropertyDef {
    pub name: &'static str,
    pub setter: Option<&'static str>,
    pub getter: Option<&'static str>,
    pub default: fn() -> Variant,
}

pub struct ClassDef {
    pub name: &'static str,
    pub parent: Option<&'static str>,
    pub ref_counted: bool,
    pub instantiable: bool,
    pub singleton: bool,
    pub methods: Vec<MethodDef>,
    pub properties: Vec<PropertyDef>,
    pub signals: Vec<&'static str>,
}

impl ClassDef {
    pub fn new(name: &'static str, parent: Option<&'static str>) -> Self {
        Self {
            name,
            parent,
            ref_counted: false,
            instantiable: false,
            singleton: false,
            methods: Vec::new(),
            properties: Vec::new(),
            signals: Vec::new(),
        }
    }

    pub fn ref_counted(mut self) -> Self {
        self.ref_counted = true;
        self
    }

    pub fn instantiable(mut self) -> Self {
        self.instantiable = true;
        self
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn method(mut self, name: &'static str, hash: u32, body: InstanceFn) -> Self {
        self.methods.push(MethodDef {
            name,
            hash,
            body: MethodBody::Instance(body),
        });
        self
    }

    pub fn static_method(mut self, name: &'static str, hash: u32, body: StaticFn) -> Self {
        self.methods.push(MethodDef {
            name,
            hash,
            body: MethodBody::Static(body),
        });
        self
    }

    /// Pure-storage property with generated accessors.
    pub fn property(
        mut self,
        name: &'static str,
        default: fn() -> Variant,
        setter: (&'static str, u32),
        getter: (&'static str, u32),
    ) -> Self {
        self.methods.push(MethodDef {
            name: setter.0,
            hash: setter.1,
            body: MethodBody::Setter(name),
        });
        self.methods.push(MethodDef {
            name: getter.0,
            hash: getter.1,
            body: MethodBody::Getter(name),
        });
        self.properties.push(PropertyDef {
            name,
            setter: Some(setter.0),
            getter: Some(getter.0),
            default,
        });
        self
    }

    /// Property whose accessors are registered separately (side effects).
    pub fn property_with(
        mut self,
        name: &'static str,
        default: fn() -> Variant,
        setter: Option<&'static str>,
        getter: Option<&'static str>,
    ) -> Self {
        self.properties.push(PropertyDef {
            name,
            setter,
            getter,
            default,
        });
        self
    }

    pub fn signals(mut self, signals: &[&'static str]) -> Self {
        self.signals.extend_from_slice(signals);
        self
    }
}

/// Registered classes plus the flattened method handle table.
pub struct ClassDb {
    classes: Vec<ClassDef>,
    parents: Vec<Option<usize>>,
    by_name: HashMap<&'static str, usize>,
    /// handle - 1 -> (class, method index)
    handles: Vec<(usize, usize)>,
    /// per class: method name -> handle
    handle_by_name: Vec<HashMap<&'static str, u64>>,
}

impl ClassDb {
    pub fn new(classes: Vec<ClassDef>) -> Self {
        let by_name: HashMap<&'static str, usize> = classes
            .iter()
            .enumerate()
            .map(|(index, class)| (class.name, index))
            .collect();

        let parents = classes
            .iter()
            .map(|class| {
                class.parent.and_then(|parent| {
                    let index = by_name.get(parent).copied();
                    if index.is_none() {
                        tracing::warn!(target: "headless", class = class.name, parent, "Unknown parent class");
                    }
                    index
                })
            })
            .collect();

        let mut handles = Vec::new();
        let mut handle_by_name = Vec::with_capacity(classes.len());
        for (class_index, class) in classes.iter().enumerate() {
            let mut names = HashMap::new();
            for (method_index, method) in class.methods.iter().enumerate() {
                handles.push((class_index, method_index));
                names.insert(method.name, handles.len() as u64);
            }
            handle_by_name.push(names);
        }

        Self {
            classes,
            parents,
            by_name,
            handles,
            handle_by_name,
        }
    }

    /// Classes modelled by the headless engine.
    pub fn standard() -> Self {
        let mut classes = Vec::new();
        super::object::register(&mut classes);
        super::mesh::register(&mut classes);
        super::scene::register(&mut classes);
        super::socket::register(&mut classes);
        super::geometry::register(&mut classes);
        Self::new(classes)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn class(&self, index: usize) -> &ClassDef {
        &self.classes[index]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// `index` followed by its ancestors.
    pub fn chain(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(index), move |&current| self.parents[current])
    }

    pub fn inherits(&self, index: usize, ancestor: &str) -> bool {
        self.chain(index).any(|current| self.classes[current].name == ancestor)
    }

    /// Method handle for `method` as seen from `index`.
    pub fn find_method(&self, index: usize, method: &str) -> Option<(MethodHandle, &MethodDef)> {
        self.chain(index).find_map(|current| {
            let raw = *self.handle_by_name[current].get(method)?;
            let handle = MethodHandle::from_raw(raw)?;
            self.method(handle).map(|(_, def)| (handle, def))
        })
    }

    pub fn method(&self, handle: MethodHandle) -> Option<(&ClassDef, &MethodDef)> {
        let (class_index, method_index) = *self.handles.get(handle.raw().checked_sub(1)? as usize)?;
        let class = &self.classes[class_index];
        Some((class, &class.methods[method_index]))
    }

    pub fn find_property(&self, index: usize, property: &str) -> Option<&PropertyDef> {
        self.chain(index).find_map(|current| {
            self.classes[current]
                .properties
                .iter()
                .find(|def| def.name == property)
        })
    }

    pub fn has_signal(&self, index: usize, signal: &str) -> bool {
        self.chain(index).any(|current| {
            self.classes[current]
                .signals
                .iter()
                .any(|declared| *declared == signal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &HeadlessEngine, _: ObjectId, _: &[Variant]) -> Variant {
        Variant::Nil
    }

    fn sample() -> ClassDb {
        ClassDb::new(vec![
            ClassDef::new("Base", None)
                .method("base_method", 11, noop)
                .property("speed", || Variant::Float(1.0), ("set_speed", 12), ("get_speed", 13))
                .signals(&["pinged"]),
            ClassDef::new("Derived", Some("Base"))
                .instantiable()
                .method("derived_method", 21, noop),
        ])
    }

    #[test]
    fn test_methods_resolve_through_parents() {
        let db = sample();
        let derived = db.index_of("Derived").unwrap();
        let (handle, def) = db.find_method(derived, "base_method").unwrap();
        assert_eq!(def.hash, 11);
        assert_eq!(db.method(handle).map(|(class, _)| class.name), Some("Base"));
        assert!(db.find_method(db.index_of("Base").unwrap(), "derived_method").is_none());
    }

    #[test]
    fn test_properties_and_signals_are_inherited() {
        let db = sample();
        let derived = db.index_of("Derived").unwrap();
        assert!(db.has_signal(derived, "pinged"));
        assert!(db.inherits(derived, "Base"));
        let property = db.find_property(derived, "speed").unwrap();
        assert_eq!((property.default)(), Variant::Float(1.0));
        assert_eq!(property.setter, Some("set_speed"));
    }

    #[test]
    fn test_standard_database_is_consistent() {
        let db = ClassDb::standard();
        for index in 0..db.len() {
            let class = db.class(index);
            assert!(db.inherits(index, "Object"), "{} is detached", class.name);
            for property in &class.properties {
                for accessor in property.setter.iter().chain(property.getter.iter()) {
                    assert!(
                        db.find_method(index, accessor).is_some(),
                        "{}.{} has no accessor {}",
                        class.name,
                        property.name,
                        accessor
                    );
                }
            }
        }
    }
}
