//! `CanvasItem`: abstract base of everything drawn in 2D.

use crate::bindings::call::{call_0, call_1};
use crate::bindings::callable::Callable;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::signal;
use crate::bindings::variant::Color;
use crate::classes::Node;

static SET_VISIBLE: MethodBind = MethodBind::new("CanvasItem", "set_visible", 2586408642);
static IS_VISIBLE: MethodBind = MethodBind::new("CanvasItem", "is_visible", 36873697);
static SET_MODULATE: MethodBind = MethodBind::new("CanvasItem", "set_modulate", 2920490490);
static GET_MODULATE: MethodBind = MethodBind::new("CanvasItem", "get_modulate", 3444240500);
static SHOW: MethodBind = MethodBind::new("CanvasItem", "show", 3218959716);
static HIDE: MethodBind = MethodBind::new("CanvasItem", "hide", 3218959716);
static IS_VISIBLE_IN_TREE: MethodBind =
    MethodBind::new("CanvasItem", "is_visible_in_tree", 36873697);
static QUEUE_REDRAW: MethodBind = MethodBind::new("CanvasItem", "queue_redraw", 3218959716);

pub mod signals {
    use crate::bindings::string_name::StaticName;

    pub static DRAW: StaticName = StaticName::new("draw");
    pub static VISIBILITY_CHANGED: StaticName = StaticName::new("visibility_changed");
    pub static HIDDEN: StaticName = StaticName::new("hidden");
}

crate::engine_class! {
    pub struct CanvasItem : Node {
        methods: [
            "set_visible",
            "is_visible",
            "set_modulate",
            "get_modulate",
            "show",
            "hide",
            "is_visible_in_tree",
            "queue_redraw",
        ],
        properties: ["visible", "modulate"],
        signals: ["draw", "visibility_changed", "hidden"],
    }
}

impl CanvasItem {
    pub fn set_visible(&self, visible: bool) {
        call_1(&SET_VISIBLE, self.handle(), visible)
    }

    pub fn is_visible(&self) -> bool {
        call_0(&IS_VISIBLE, self.handle())
    }

    pub fn set_modulate(&self, modulate: Color) {
        call_1(&SET_MODULATE, self.handle(), modulate)
    }

    pub fn get_modulate(&self) -> Color {
        call_0(&GET_MODULATE, self.handle())
    }

    pub fn show(&self) {
        call_0(&SHOW, self.handle())
    }

    pub fn hide(&self) {
        call_0(&HIDE, self.handle())
    }

    /// Visible and inside the tree with every canvas-item ancestor visible.
    pub fn is_visible_in_tree(&self) -> bool {
        call_0(&IS_VISIBLE_IN_TREE, self.handle())
    }

    pub fn queue_redraw(&self) {
        call_0(&QUEUE_REDRAW, self.handle())
    }

    pub fn connect_draw(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::DRAW.get(), move |_: ()| callback())
    }

    pub fn disconnect_draw(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::DRAW.get(), callable)
    }

    pub fn connect_visibility_changed(
        &self,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Callable {
        signal::connect(self.handle(), signals::VISIBILITY_CHANGED.get(), move |_: ()| callback())
    }

    pub fn disconnect_visibility_changed(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::VISIBILITY_CHANGED.get(), callable)
    }

    pub fn connect_hidden(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::HIDDEN.get(), move |_: ()| callback())
    }

    pub fn disconnect_hidden(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::HIDDEN.get(), callable)
    }
}
