//! `Node2D`: canvas item with a 2D transform.

use crate::bindings::call::{call_0, call_1};
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::classes::CanvasItem;
use crate::core::error::BindingResult;
use glam::Vec2;

static SET_POSITION: MethodBind = MethodBind::new("Node2D", "set_position", 743155724);
static GET_POSITION: MethodBind = MethodBind::new("Node2D", "get_position", 3341600327);
static SET_ROTATION: MethodBind = MethodBind::new("Node2D", "set_rotation", 373806689);
static GET_ROTATION: MethodBind = MethodBind::new("Node2D", "get_rotation", 1740695150);
static SET_SCALE: MethodBind = MethodBind::new("Node2D", "set_scale", 743155724);
static GET_SCALE: MethodBind = MethodBind::new("Node2D", "get_scale", 3341600327);
static SET_SKEW: MethodBind = MethodBind::new("Node2D", "set_skew", 373806689);
static GET_SKEW: MethodBind = MethodBind::new("Node2D", "get_skew", 1740695150);
static ROTATE: MethodBind = MethodBind::new("Node2D", "rotate", 373806689);
static TRANSLATE: MethodBind = MethodBind::new("Node2D", "translate", 743155724);

crate::engine_class! {
    pub struct Node2D : CanvasItem {
        methods: [
            "set_position",
            "get_position",
            "set_rotation",
            "get_rotation",
            "set_scale",
            "get_scale",
            "set_skew",
            "get_skew",
            "rotate",
            "translate",
        ],
        properties: ["position", "rotation", "scale", "skew"],
        signals: [],
    }
}

impl Node2D {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn set_position(&self, position: Vec2) {
        call_1(&SET_POSITION, self.handle(), position)
    }

    pub fn get_position(&self) -> Vec2 {
        call_0(&GET_POSITION, self.handle())
    }

    /// 弧度
    pub fn set_rotation(&self, radians: f32) {
        call_1(&SET_ROTATION, self.handle(), radians)
    }

    pub fn get_rotation(&self) -> f32 {
        call_0(&GET_ROTATION, self.handle())
    }

    pub fn set_scale(&self, scale: Vec2) {
        call_1(&SET_SCALE, self.handle(), scale)
    }

    pub fn get_scale(&self) -> Vec2 {
        call_0(&GET_SCALE, self.handle())
    }

    pub fn set_skew(&self, radians: f32) {
        call_1(&SET_SKEW, self.handle(), radians)
    }

    pub fn get_skew(&self) -> f32 {
        call_0(&GET_SKEW, self.handle())
    }

    pub fn rotate(&self, radians: f32) {
        call_1(&ROTATE, self.handle(), radians)
    }

    pub fn translate(&self, offset: Vec2) {
        call_1(&TRANSLATE, self.handle(), offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::class_info::EngineClass;
    use crate::bindings::variant::Color;
    use crate::headless::HeadlessEngine;

    #[test]
    fn test_transform_defaults_and_updates() {
        HeadlessEngine::install();
        let node = Node2D::new().unwrap();
        assert_eq!(node.get_position(), Vec2::ZERO);
        assert_eq!(node.get_scale(), Vec2::ONE);

        node.set_position(Vec2::new(1.0, 2.0));
        node.translate(Vec2::new(0.5, -1.0));
        assert_eq!(node.get_position(), Vec2::new(1.5, 1.0));

        node.set_rotation(0.25);
        node.rotate(0.5);
        assert!((node.get_rotation() - 0.75).abs() < 1e-6);
        node.free();
    }

    #[test]
    fn test_visibility_follows_ancestors() {
        let engine = HeadlessEngine::install();
        let parent = Node2D::new().unwrap();
        let child = Node2D::new().unwrap();
        parent.add_child(&child);
        assert!(!child.is_visible_in_tree());

        engine.scene_root().add_child(&parent);
        assert!(child.is_visible());
        assert!(child.is_visible_in_tree());
        assert_eq!(child.get_modulate(), Color::WHITE);

        parent.hide();
        assert!(child.is_visible());
        assert!(!child.is_visible_in_tree());
        parent.free();
    }
}
