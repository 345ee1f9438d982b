//! `RefCounted`: base of every reference-counted class.

use crate::bindings::call::call_0;
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::classes::Object;
use crate::core::error::BindingResult;

static GET_REFERENCE_COUNT: MethodBind =
    MethodBind::new("RefCounted", "get_reference_count", 3905245786);

crate::engine_class! {
    /// 引用计数对象，最后一个包装器释放时由引擎销毁
    pub struct RefCounted : Object {
        memory: RefCounted,
        methods: ["get_reference_count"],
        properties: [],
        signals: [],
    }
}

impl RefCounted {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn get_reference_count(&self) -> i32 {
        call_0(&GET_REFERENCE_COUNT, self.handle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::backend::Memory;
    use crate::bindings::class_info::EngineClass;
    use crate::headless::HeadlessEngine;

    #[test]
    fn test_clone_and_drop_track_references() {
        let engine = HeadlessEngine::install();
        let counted = RefCounted::new().unwrap();
        assert_eq!(RefCounted::MEMORY, Memory::RefCounted);
        assert_eq!(counted.handle().memory(), Memory::RefCounted);
        assert_eq!(counted.get_reference_count(), 1);

        let second = counted.clone();
        assert_eq!(counted.get_reference_count(), 2);
        drop(second);
        assert_eq!(counted.get_reference_count(), 1);

        let id = counted.instance_id();
        drop(counted);
        assert!(!engine.is_alive(id));
    }

    #[test]
    fn test_adopting_an_id_takes_a_reference() {
        HeadlessEngine::install();
        let counted = RefCounted::new().unwrap();
        let adopted = Object::from_id(counted.instance_id());
        assert!(adopted.handle().is_ref_counted());
        assert_eq!(counted.get_reference_count(), 2);
    }
}
