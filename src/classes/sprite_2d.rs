//! `Sprite2D`: textured node, optionally an animation sheet.

use crate::bindings::call::{call_0, call_1};
use crate::bindings::callable::Callable;
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::signal;
use crate::bindings::variant::Rect2;
use crate::classes::{Node2D, Texture2D};
use crate::core::error::BindingResult;
use glam::{IVec2, Vec2};

static SET_TEXTURE: MethodBind = MethodBind::new("Sprite2D", "set_texture", 4051416890);
static GET_TEXTURE: MethodBind = MethodBind::new("Sprite2D", "get_texture", 3635182373);
static SET_CENTERED: MethodBind = MethodBind::new("Sprite2D", "set_centered", 2586408642);
static IS_CENTERED: MethodBind = MethodBind::new("Sprite2D", "is_centered", 36873697);
static SET_OFFSET: MethodBind = MethodBind::new("Sprite2D", "set_offset", 743155724);
static GET_OFFSET: MethodBind = MethodBind::new("Sprite2D", "get_offset", 3341600327);
static SET_FLIP_H: MethodBind = MethodBind::new("Sprite2D", "set_flip_h", 2586408642);
static IS_FLIPPED_H: MethodBind = MethodBind::new("Sprite2D", "is_flipped_h", 36873697);
static SET_FLIP_V: MethodBind = MethodBind::new("Sprite2D", "set_flip_v", 2586408642);
static IS_FLIPPED_V: MethodBind = MethodBind::new("Sprite2D", "is_flipped_v", 36873697);
static SET_HFRAMES: MethodBind = MethodBind::new("Sprite2D", "set_hframes", 1286410249);
static GET_HFRAMES: MethodBind = MethodBind::new("Sprite2D", "get_hframes", 3905245786);
static SET_VFRAMES: MethodBind = MethodBind::new("Sprite2D", "set_vframes", 1286410249);
static GET_VFRAMES: MethodBind = MethodBind::new("Sprite2D", "get_vframes", 3905245786);
static SET_FRAME: MethodBind = MethodBind::new("Sprite2D", "set_frame", 1286410249);
static GET_FRAME: MethodBind = MethodBind::new("Sprite2D", "get_frame", 3905245786);
static SET_FRAME_COORDS: MethodBind = MethodBind::new("Sprite2D", "set_frame_coords", 1130785943);
static GET_FRAME_COORDS: MethodBind = MethodBind::new("Sprite2D", "get_frame_coords", 3690982128);
static SET_REGION_ENABLED: MethodBind =
    MethodBind::new("Sprite2D", "set_region_enabled", 2586408642);
static IS_REGION_ENABLED: MethodBind = MethodBind::new("Sprite2D", "is_region_enabled", 36873697);
static SET_REGION_RECT: MethodBind = MethodBind::new("Sprite2D", "set_region_rect", 2046264180);
static GET_REGION_RECT: MethodBind = MethodBind::new("Sprite2D", "get_region_rect", 1639390495);
static GET_RECT: MethodBind = MethodBind::new("Sprite2D", "get_rect", 1639390495);

pub mod signals {
    use crate::bindings::string_name::StaticName;

    pub static FRAME_CHANGED: StaticName = StaticName::new("frame_changed");
    pub static TEXTURE_CHANGED: StaticName = StaticName::new("texture_changed");
}

crate::engine_class! {
    pub struct Sprite2D : Node2D {
        methods: [
            "set_texture",
            "get_texture",
            "set_centered",
            "is_centered",
            "set_offset",
            "get_offset",
            "set_flip_h",
            "is_flipped_h",
            "set_flip_v",
            "is_flipped_v",
            "set_hframes",
            "get_hframes",
            "set_vframes",
            "get_vframes",
            "set_frame",
            "get_frame",
            "set_frame_coords",
            "get_frame_coords",
            "set_region_enabled",
            "is_region_enabled",
            "set_region_rect",
            "get_region_rect",
            "get_rect",
        ],
        properties: [
            "texture",
            "centered",
            "offset",
            "flip_h",
            "flip_v",
            "hframes",
            "vframes",
            "frame",
            "frame_coords",
            "region_enabled",
            "region_rect",
        ],
        signals: ["frame_changed", "texture_changed"],
    }
}

impl Sprite2D {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn set_texture(&self, texture: Option<&Texture2D>) {
        call_1(&SET_TEXTURE, self.handle(), texture)
    }

    pub fn get_texture(&self) -> Option<Texture2D> {
        call_0(&GET_TEXTURE, self.handle())
    }

    pub fn set_centered(&self, centered: bool) {
        call_1(&SET_CENTERED, self.handle(), centered)
    }

    pub fn is_centered(&self) -> bool {
        call_0(&IS_CENTERED, self.handle())
    }

    pub fn set_offset(&self, offset: Vec2) {
        call_1(&SET_OFFSET, self.handle(), offset)
    }

    pub fn get_offset(&self) -> Vec2 {
        call_0(&GET_OFFSET, self.handle())
    }

    pub fn set_flip_h(&self, flip: bool) {
        call_1(&SET_FLIP_H, self.handle(), flip)
    }

    pub fn is_flipped_h(&self) -> bool {
        call_0(&IS_FLIPPED_H, self.handle())
    }

    pub fn set_flip_v(&self, flip: bool) {
        call_1(&SET_FLIP_V, self.handle(), flip)
    }

    pub fn is_flipped_v(&self) -> bool {
        call_0(&IS_FLIPPED_V, self.handle())
    }

    pub fn set_hframes(&self, hframes: i32) {
        call_1(&SET_HFRAMES, self.handle(), hframes)
    }

    pub fn get_hframes(&self) -> i32 {
        call_0(&GET_HFRAMES, self.handle())
    }

    pub fn set_vframes(&self, vframes: i32) {
        call_1(&SET_VFRAMES, self.handle(), vframes)
    }

    pub fn get_vframes(&self) -> i32 {
        call_0(&GET_VFRAMES, self.handle())
    }

    pub fn set_frame(&self, frame: i32) {
        call_1(&SET_FRAME, self.handle(), frame)
    }

    pub fn get_frame(&self) -> i32 {
        call_0(&GET_FRAME, self.handle())
    }

    /// Frame as a sheet coordinate. The engine clamps it to
    /// `hframes` × `vframes`, so the getter may not return what was set.
    pub fn set_frame_coords(&self, coords: IVec2) {
        call_1(&SET_FRAME_COORDS, self.handle(), coords)
    }

    pub fn get_frame_coords(&self) -> IVec2 {
        call_0(&GET_FRAME_COORDS, self.handle())
    }

    pub fn set_region_enabled(&self, enabled: bool) {
        call_1(&SET_REGION_ENABLED, self.handle(), enabled)
    }

    pub fn is_region_enabled(&self) -> bool {
        call_0(&IS_REGION_ENABLED, self.handle())
    }

    pub fn set_region_rect(&self, rect: Rect2) {
        call_1(&SET_REGION_RECT, self.handle(), rect)
    }

    pub fn get_region_rect(&self) -> Rect2 {
        call_0(&GET_REGION_RECT, self.handle())
    }

    /// Local bounds of the drawn frame.
    pub fn get_rect(&self) -> Rect2 {
        call_0(&GET_RECT, self.handle())
    }

    pub fn connect_frame_changed(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::FRAME_CHANGED.get(), move |_: ()| callback())
    }

    pub fn disconnect_frame_changed(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::FRAME_CHANGED.get(), callable)
    }

    pub fn connect_texture_changed(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::TEXTURE_CHANGED.get(), move |_: ()| callback())
    }

    pub fn disconnect_texture_changed(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::TEXTURE_CHANGED.get(), callable)
    }
}
