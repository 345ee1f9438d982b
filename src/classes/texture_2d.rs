//! `Texture2D` and its placeholder implementation.

use crate::bindings::call::{call_0, call_1};
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::classes::Resource;
use crate::core::error::BindingResult;
use glam::Vec2;

static GET_WIDTH: MethodBind = MethodBind::new("Texture2D", "get_width", 3905245786);
static GET_HEIGHT: MethodBind = MethodBind::new("Texture2D", "get_height", 3905245786);
static GET_SIZE: MethodBind = MethodBind::new("Texture2D", "get_size", 3341600327);
static HAS_ALPHA: MethodBind = MethodBind::new("Texture2D", "has_alpha", 36873697);

static SET_SIZE: MethodBind = MethodBind::new("PlaceholderTexture2D", "set_size", 743155724);

crate::engine_class! {
    /// Abstract 2D texture.
    pub struct Texture2D : Resource {
        methods: ["get_width", "get_height", "get_size", "has_alpha"],
        properties: [],
        signals: [],
    }
}

impl Texture2D {
    pub fn get_width(&self) -> i32 {
        call_0(&GET_WIDTH, self.handle())
    }

    pub fn get_height(&self) -> i32 {
        call_0(&GET_HEIGHT, self.handle())
    }

    pub fn get_size(&self) -> Vec2 {
        call_0(&GET_SIZE, self.handle())
    }

    pub fn has_alpha(&self) -> bool {
        call_0(&HAS_ALPHA, self.handle())
    }
}

crate::engine_class! {
    /// 只有尺寸、没有像素数据的纹理
    pub struct PlaceholderTexture2D : Texture2D {
        methods: ["set_size"],
        properties: ["size"],
        signals: [],
    }
}

impl PlaceholderTexture2D {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn set_size(&self, size: Vec2) {
        call_1(&SET_SIZE, self.handle(), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::string_name::StringName;
    use crate::bindings::class_info::EngineClass;
    use crate::headless::HeadlessEngine;

    #[test]
    fn test_placeholder_size_drives_dimensions() {
        HeadlessEngine::install();
        let texture = PlaceholderTexture2D::new().unwrap();
        texture.set_size(Vec2::new(64.0, 32.0));

        assert_eq!(texture.get_size(), Vec2::new(64.0, 32.0));
        assert_eq!(texture.get_width(), 64);
        assert_eq!(texture.get_height(), 32);
        assert!(!texture.has_alpha());
    }

    #[test]
    fn test_size_property_is_declared_on_placeholder_only() {
        let size = StringName::new("size");
        assert!(PlaceholderTexture2D::class_info().has_property(&size));
        assert!(!Texture2D::class_info().has_property(&size));
        assert!(PlaceholderTexture2D::class_info().has_method(&StringName::new("get_size")));
    }
}
