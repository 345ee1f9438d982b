//! `AudioStream`: base audio resource.

use crate::bindings::call::call_0;
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::classes::Resource;
use crate::core::error::BindingResult;

static GET_LENGTH: MethodBind = MethodBind::new("AudioStream", "get_length", 1740695150);
static IS_MONOPHONIC: MethodBind = MethodBind::new("AudioStream", "is_monophonic", 36873697);

crate::engine_class! {
    pub struct AudioStream : Resource {
        methods: ["get_length", "is_monophonic"],
        properties: [],
        signals: [],
    }
}

impl AudioStream {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    /// 长度（秒），无限流为 0
    pub fn get_length(&self) -> f64 {
        call_0(&GET_LENGTH, self.handle())
    }

    pub fn is_monophonic(&self) -> bool {
        call_0(&IS_MONOPHONIC, self.handle())
    }
}
