//! `Resource`: serializable, reference-counted engine data.

use crate::bindings::call::{call_0, call_1};
use crate::bindings::callable::Callable;
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::signal;
use crate::classes::RefCounted;
use crate::core::error::BindingResult;

static SET_NAME: MethodBind = MethodBind::new("Resource", "set_name", 83702148);
static GET_NAME: MethodBind = MethodBind::new("Resource", "get_name", 201670096);
static SET_PATH: MethodBind = MethodBind::new("Resource", "set_path", 83702148);
static GET_PATH: MethodBind = MethodBind::new("Resource", "get_path", 201670096);
static SET_LOCAL_TO_SCENE: MethodBind =
    MethodBind::new("Resource", "set_local_to_scene", 2586408642);
static IS_LOCAL_TO_SCENE: MethodBind = MethodBind::new("Resource", "is_local_to_scene", 36873697);
static EMIT_CHANGED: MethodBind = MethodBind::new("Resource", "emit_changed", 3218959716);
static DUPLICATE: MethodBind = MethodBind::new("Resource", "duplicate", 482882304);

pub mod signals {
    use crate::bindings::string_name::StaticName;

    pub static CHANGED: StaticName = StaticName::new("changed");
}

crate::engine_class! {
    pub struct Resource : RefCounted {
        methods: [
            "set_name",
            "get_name",
            "set_path",
            "get_path",
            "set_local_to_scene",
            "is_local_to_scene",
            "emit_changed",
            "duplicate",
        ],
        properties: ["resource_name", "resource_path", "resource_local_to_scene"],
        signals: ["changed"],
    }
}

impl Resource {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn set_resource_name(&self, name: &str) {
        call_1(&SET_NAME, self.handle(), name)
    }

    pub fn get_resource_name(&self) -> String {
        call_0(&GET_NAME, self.handle())
    }

    pub fn set_resource_path(&self, path: &str) {
        call_1(&SET_PATH, self.handle(), path)
    }

    pub fn get_resource_path(&self) -> String {
        call_0(&GET_PATH, self.handle())
    }

    pub fn set_resource_local_to_scene(&self, enable: bool) {
        call_1(&SET_LOCAL_TO_SCENE, self.handle(), enable)
    }

    pub fn is_resource_local_to_scene(&self) -> bool {
        call_0(&IS_LOCAL_TO_SCENE, self.handle())
    }

    pub fn emit_changed(&self) {
        call_0(&EMIT_CHANGED, self.handle())
    }

    /// Shallow copy (`subresources = false`).
    pub fn duplicate(&self) -> Option<Resource> {
        self.duplicate_ex().done()
    }

    pub fn duplicate_ex(&self) -> ExDuplicate<'_> {
        ExDuplicate {
            resource: self,
            subresources: false,
        }
    }

    pub fn connect_changed(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::CHANGED.get(), move |_: ()| callback())
    }

    pub fn disconnect_changed(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::CHANGED.get(), callable)
    }
}

/// `duplicate` with overridable defaults.
#[must_use]
pub struct ExDuplicate<'a> {
    resource: &'a Resource,
    subresources: bool,
}

impl ExDuplicate<'_> {
    pub fn subresources(mut self, subresources: bool) -> Self {
        self.subresources = subresources;
        self
    }

    pub fn done(self) -> Option<Resource> {
        call_1(&DUPLICATE, self.resource.handle(), self.subresources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::class_info::EngineClass;
    use crate::headless::HeadlessEngine;
    use crate::bindings::variant::Variant;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_properties_are_stored_natively() {
        HeadlessEngine::install();
        let resource = Resource::new().unwrap();
        resource.set_resource_name("grass");
        resource.set_resource_local_to_scene(true);
        assert_eq!(resource.get_resource_name(), "grass");
        assert!(resource.is_resource_local_to_scene());
        assert_eq!(resource.get_resource_path(), "");
    }

    #[test]
    fn test_duplicate_passes_default_flag() {
        let engine = HeadlessEngine::install();
        let resource = Resource::new().unwrap();
        resource.set_resource_name("rock");

        let copy = resource.duplicate().unwrap();
        assert_ne!(copy.instance_id(), resource.instance_id());
        assert_eq!(copy.get_resource_name(), "rock");
        assert_eq!(
            engine.last_args(resource.instance_id(), "duplicate"),
            Some(vec![Variant::Bool(false)])
        );

        resource.duplicate_ex().subresources(true).done();
        assert_eq!(
            engine.last_args(resource.instance_id(), "duplicate"),
            Some(vec![Variant::Bool(true)])
        );
    }

    #[test]
    fn test_changed_signal() {
        HeadlessEngine::install();
        let resource = Resource::new().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let callable = resource.connect_changed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        resource.emit_changed();
        resource.emit_changed();
        resource.disconnect_changed(&callable);
        resource.emit_changed();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
