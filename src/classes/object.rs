//! `Object`: root of the wrapped class hierarchy.

use crate::bindings::backend::{ConnectFlags, ErrorCode, Memory, ObjectId};
use crate::bindings::call::{call_0, call_1, call_2, call_vararg};
use crate::bindings::callable::Callable;
use crate::bindings::class_info::{construct, ClassInfo, EngineClass};
use crate::bindings::method_bind::MethodBind;
use crate::bindings::object_handle::ObjectHandle;
use crate::bindings::runtime;
use crate::bindings::signal;
use crate::bindings::string_name::StringName;
use crate::bindings::variant::{FromVariant, ToVariant, Variant, VariantConversionError, VariantType};
use crate::core::error::BindingResult;

static GET_CLASS: MethodBind = MethodBind::new("Object", "get_class", 201670096);
static IS_CLASS: MethodBind = MethodBind::new("Object", "is_class", 3927539163);
static GET: MethodBind = MethodBind::new("Object", "get", 2760726917);
static SET: MethodBind = MethodBind::new("Object", "set", 3776071444);
static CALL: MethodBind = MethodBind::new("Object", "call", 3400424181);
static HAS_METHOD: MethodBind = MethodBind::new("Object", "has_method", 2619796661);
static HAS_SIGNAL: MethodBind = MethodBind::new("Object", "has_signal", 2619796661);
static EMIT_SIGNAL: MethodBind = MethodBind::new("Object", "emit_signal", 4047867050);
static GET_INSTANCE_ID: MethodBind = MethodBind::new("Object", "get_instance_id", 3905245786);

/// Signal names declared by `Object`.
pub mod signals {
    use crate::bindings::string_name::StaticName;

    pub static SCRIPT_CHANGED: StaticName = StaticName::new("script_changed");
    pub static PROPERTY_LIST_CHANGED: StaticName = StaticName::new("property_list_changed");
}

/// Wrapper around an engine object id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Object {
    handle: ObjectHandle,
}

impl EngineClass for Object {
    const CLASS_NAME: &'static str = "Object";
    const MEMORY: Memory = Memory::Manual;

    fn class_info() -> &'static ClassInfo {
        static INFO: ClassInfo = ClassInfo::new(
            "Object",
            None,
            Memory::Manual,
            &[
                "get_class",
                "is_class",
                "get",
                "set",
                "call",
                "has_method",
                "has_signal",
                "emit_signal",
                "get_instance_id",
            ],
            &[],
            &["script_changed", "property_list_changed"],
        );
        &INFO
    }

    fn from_object_unchecked(object: Object) -> Self {
        object
    }

    fn as_object(&self) -> &Object {
        self
    }

    fn into_object(self) -> Object {
        self
    }
}

impl Object {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    /// Adopts an existing native object.
    pub fn from_id(id: ObjectId) -> Self {
        Self {
            handle: ObjectHandle::adopt(id),
        }
    }

    pub(crate) fn from_handle(handle: ObjectHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    pub fn instance_id(&self) -> ObjectId {
        self.handle.id()
    }

    pub fn get_class(&self) -> String {
        call_0(&GET_CLASS, &self.handle)
    }

    pub fn is_class(&self, class: &str) -> bool {
        call_1(&IS_CLASS, &self.handle, class)
    }

    pub fn get(&self, property: impl Into<StringName>) -> Variant {
        call_1(&GET, &self.handle, property.into())
    }

    pub fn set(&self, property: impl Into<StringName>, value: impl ToVariant) {
        call_2(&SET, &self.handle, property.into(), value)
    }

    pub fn call(&self, method: impl Into<StringName>, args: &[Variant]) -> Variant {
        call_vararg(&CALL, &self.handle, &[method.into().to_variant()], args)
    }

    pub fn has_method(&self, method: impl Into<StringName>) -> bool {
        call_1(&HAS_METHOD, &self.handle, method.into())
    }

    pub fn has_signal(&self, signal: impl Into<StringName>) -> bool {
        call_1(&HAS_SIGNAL, &self.handle, signal.into())
    }

    pub fn emit_signal(&self, signal: impl Into<StringName>, args: &[Variant]) -> ErrorCode {
        call_vararg(&EMIT_SIGNAL, &self.handle, &[signal.into().to_variant()], args)
    }

    pub fn get_instance_id(&self) -> u64 {
        let id: i64 = call_0(&GET_INSTANCE_ID, &self.handle);
        id as u64
    }

    pub fn connect(
        &self,
        signal: impl Into<StringName>,
        callable: &Callable,
        flags: ConnectFlags,
    ) -> ErrorCode {
        signal::connect_callable(&self.handle, &signal.into(), callable, flags)
    }

    pub fn disconnect(&self, signal: impl Into<StringName>, callable: &Callable) {
        signal::disconnect(&self.handle, &signal.into(), callable)
    }

    pub fn is_connected(&self, signal: impl Into<StringName>, callable: &Callable) -> bool {
        signal::is_connected(&self.handle, &signal.into(), callable)
    }

    pub fn is_instance_valid(&self) -> bool {
        runtime::backend().is_instance_valid(self.handle.id())
    }

    /// Casts to `T` if the native object is a `T`.
    pub fn try_cast<T: EngineClass>(&self) -> Option<T> {
        if self.is_class(T::CLASS_NAME) {
            Some(T::from_object_unchecked(self.clone()))
        } else {
            None
        }
    }

    /// Destroys a manually managed object.
    ///
    /// Reference-counted objects are never freed here; the engine releases
    /// them when the last reference goes away.
    pub fn free(self) {
        if self.handle.is_ref_counted() {
            tracing::error!(
                target: "bindings",
                id = self.handle.id().raw(),
                "Refusing to free a reference-counted object"
            );
            return;
        }
        runtime::backend().free(self.handle.id());
    }

    pub fn connect_script_changed(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(&self.handle, signals::SCRIPT_CHANGED.get(), move |_: ()| callback())
    }

    pub fn disconnect_script_changed(&self, callable: &Callable) {
        signal::disconnect(&self.handle, signals::SCRIPT_CHANGED.get(), callable)
    }

    pub fn connect_property_list_changed(
        &self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Callable {
        signal::connect(&self.handle, signals::PROPERTY_LIST_CHANGED.get(), move |_: ()| callback())
    }

    pub fn disconnect_property_list_changed(&self, callable: &Callable) {
        signal::disconnect(&self.handle, signals::PROPERTY_LIST_CHANGED.get(), callable)
    }
}

impl ToVariant for Object {
    fn to_variant(&self) -> Variant {
        Variant::Object(Some(self.handle.id()))
    }
}

impl ToVariant for Option<Object> {
    fn to_variant(&self) -> Variant {
        Variant::Object(self.as_ref().map(Object::instance_id))
    }
}

impl ToVariant for Option<&Object> {
    fn to_variant(&self) -> Variant {
        Variant::Object(self.map(Object::instance_id))
    }
}

impl FromVariant for Option<Object> {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        Option::<ObjectId>::try_from_variant(variant).map(|id| id.map(Object::from_id))
    }
}

impl FromVariant for Object {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        Option::<Object>::try_from_variant(variant)?
            .ok_or_else(|| VariantConversionError::new(VariantType::Object, variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classes::{ArrayMesh, Node, RefCounted};
    use crate::headless::HeadlessEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_object_is_manual() {
        let engine = HeadlessEngine::install();
        let object = Object::new().unwrap();
        assert!(!object.handle().is_ref_counted());
        assert_eq!(object.get_class(), "Object");

        let id = object.instance_id();
        let copy = object.clone();
        drop(copy);
        assert!(engine.is_alive(id));

        object.free();
        assert!(!engine.is_alive(id));
    }

    #[test]
    fn test_generic_property_access() {
        HeadlessEngine::install();
        let object = Object::new().unwrap();
        object.set("health", 75_i64);
        assert_eq!(object.get("health"), Variant::Int(75));
        assert_eq!(object.get("missing"), Variant::Nil);
        object.free();
    }

    #[test]
    fn test_dynamic_call_matches_typed_call() {
        HeadlessEngine::install();
        let node = Node::new().unwrap();
        let dynamic = node.call("get_class", &[]);
        assert_eq!(dynamic, Variant::String(node.get_class()));
        node.free();
    }

    #[test]
    fn test_try_cast_checks_native_class() {
        HeadlessEngine::install();
        let mesh = ArrayMesh::new().unwrap();
        let object = mesh.as_object().clone();
        assert!(object.try_cast::<ArrayMesh>().is_some());
        assert!(object.try_cast::<RefCounted>().is_some());
        assert!(object.try_cast::<Node>().is_none());
    }

    #[test]
    fn test_free_refuses_ref_counted() {
        let engine = HeadlessEngine::install();
        let counted = RefCounted::new().unwrap();
        let id = counted.instance_id();
        let keep = counted.clone();
        counted.into_object().free();
        assert!(engine.is_alive(id));
        drop(keep);
        assert!(!engine.is_alive(id));
    }

    #[test]
    fn test_user_signal_round_trip() {
        HeadlessEngine::install();
        let object = Object::new().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let callable = object.connect_property_list_changed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(object.is_connected("property_list_changed", &callable));
        assert!(object.emit_signal("property_list_changed", &[]).is_ok());
        object.disconnect_property_list_changed(&callable);
        object.emit_signal("property_list_changed", &[]);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        object.free();
    }
}
