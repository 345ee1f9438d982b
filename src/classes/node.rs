//! `Node`: base of the scene tree.
//!
//! Nodes are manually managed. A node that is inside a parent is freed
//! together with its parent; an orphan must be freed explicitly.

use crate::bindings::call::{call_0, call_1, call_2, call_3};
use crate::bindings::callable::Callable;
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::signal;
use crate::bindings::string_name::StringName;
use crate::classes::Object;
use crate::core::error::BindingResult;

static SET_NAME: MethodBind = MethodBind::new("Node", "set_name", 3304788590);
static GET_NAME: MethodBind = MethodBind::new("Node", "get_name", 2002593661);
static ADD_CHILD: MethodBind = MethodBind::new("Node", "add_child", 3863233950);
static REMOVE_CHILD: MethodBind = MethodBind::new("Node", "remove_child", 1078189570);
static GET_CHILD: MethodBind = MethodBind::new("Node", "get_child", 541253412);
static GET_CHILD_COUNT: MethodBind = MethodBind::new("Node", "get_child_count", 894402480);
static GET_PARENT: MethodBind = MethodBind::new("Node", "get_parent", 3160264692);
static IS_INSIDE_TREE: MethodBind = MethodBind::new("Node", "is_inside_tree", 36873697);
static QUEUE_FREE: MethodBind = MethodBind::new("Node", "queue_free", 3218959716);

pub mod signals {
    use crate::bindings::string_name::StaticName;

    pub static READY: StaticName = StaticName::new("ready");
    pub static RENAMED: StaticName = StaticName::new("renamed");
    pub static TREE_ENTERED: StaticName = StaticName::new("tree_entered");
    pub static TREE_EXITING: StaticName = StaticName::new("tree_exiting");
    pub static CHILD_ENTERED_TREE: StaticName = StaticName::new("child_entered_tree");
    pub static CHILD_EXITING_TREE: StaticName = StaticName::new("child_exiting_tree");
}

crate::engine_enum! {
    /// Where an internal child is placed among its siblings.
    pub struct InternalMode {
        DISABLED = 0,
        FRONT = 1,
        BACK = 2,
    }
}

crate::engine_class! {
    pub struct Node : Object {
        methods: [
            "set_name",
            "get_name",
            "add_child",
            "remove_child",
            "get_child",
            "get_child_count",
            "get_parent",
            "is_inside_tree",
            "queue_free",
        ],
        properties: ["name"],
        signals: [
            "ready",
            "renamed",
            "tree_entered",
            "tree_exiting",
            "child_entered_tree",
            "child_exiting_tree",
        ],
    }
}

impl Node {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    pub fn set_name(&self, name: impl Into<StringName>) {
        call_1(&SET_NAME, self.handle(), name.into())
    }

    pub fn get_name(&self) -> StringName {
        call_0(&GET_NAME, self.handle())
    }

    pub fn add_child(&self, node: &Node) {
        self.add_child_ex(node).done()
    }

    pub fn add_child_ex<'a>(&'a self, node: &'a Node) -> ExAddChild<'a> {
        ExAddChild {
            parent: self,
            node,
            force_readable_name: false,
            internal: InternalMode::DISABLED,
        }
    }

    pub fn remove_child(&self, node: &Node) {
        call_1(&REMOVE_CHILD, self.handle(), node)
    }

    /// Child at `idx` among the non-internal children; negative indices
    /// count from the end.
    pub fn get_child(&self, idx: i32) -> Option<Node> {
        self.get_child_ex(idx).done()
    }

    pub fn get_child_ex(&self, idx: i32) -> ExGetChild<'_> {
        ExGetChild {
            node: self,
            idx,
            include_internal: false,
        }
    }

    pub fn get_child_count(&self) -> i32 {
        self.get_child_count_ex().done()
    }

    pub fn get_child_count_ex(&self) -> ExGetChildCount<'_> {
        ExGetChildCount {
            node: self,
            include_internal: false,
        }
    }

    pub fn get_parent(&self) -> Option<Node> {
        call_0(&GET_PARENT, self.handle())
    }

    pub fn is_inside_tree(&self) -> bool {
        call_0(&IS_INSIDE_TREE, self.handle())
    }

    /// Schedules deletion at the end of the current frame.
    pub fn queue_free(&self) {
        call_0(&QUEUE_FREE, self.handle())
    }

    pub fn connect_ready(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::READY.get(), move |_: ()| callback())
    }

    pub fn disconnect_ready(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::READY.get(), callable)
    }

    pub fn connect_renamed(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::RENAMED.get(), move |_: ()| callback())
    }

    pub fn disconnect_renamed(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::RENAMED.get(), callable)
    }

    pub fn connect_tree_entered(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::TREE_ENTERED.get(), move |_: ()| callback())
    }

    pub fn disconnect_tree_entered(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::TREE_ENTERED.get(), callable)
    }

    pub fn connect_tree_exiting(&self, callback: impl Fn() + Send + Sync + 'static) -> Callable {
        signal::connect(self.handle(), signals::TREE_EXITING.get(), move |_: ()| callback())
    }

    pub fn disconnect_tree_exiting(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::TREE_EXITING.get(), callable)
    }

    pub fn connect_child_entered_tree(
        &self,
        callback: impl Fn(Node) + Send + Sync + 'static,
    ) -> Callable {
        signal::connect(
            self.handle(),
            signals::CHILD_ENTERED_TREE.get(),
            move |(node,): (Node,)| callback(node),
        )
    }

    pub fn disconnect_child_entered_tree(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::CHILD_ENTERED_TREE.get(), callable)
    }

    pub fn connect_child_exiting_tree(
        &self,
        callback: impl Fn(Node) + Send + Sync + 'static,
    ) -> Callable {
        signal::connect(
            self.handle(),
            signals::CHILD_EXITING_TREE.get(),
            move |(node,): (Node,)| callback(node),
        )
    }

    pub fn disconnect_child_exiting_tree(&self, callable: &Callable) {
        signal::disconnect(self.handle(), signals::CHILD_EXITING_TREE.get(), callable)
    }
}

#[must_use]
pub struct ExAddChild<'a> {
    parent: &'a Node,
    node: &'a Node,
    force_readable_name: bool,
    internal: InternalMode,
}

impl ExAddChild<'_> {
    pub fn force_readable_name(mut self, force_readable_name: bool) -> Self {
        self.force_readable_name = force_readable_name;
        self
    }

    pub fn internal(mut self, internal: InternalMode) -> Self {
        self.internal = internal;
        self
    }

    pub fn done(self) {
        call_3(
            &ADD_CHILD,
            self.parent.handle(),
            self.node,
            self.force_readable_name,
            self.internal,
        )
    }
}

#[must_use]
pub struct ExGetChild<'a> {
    node: &'a Node,
    idx: i32,
    include_internal: bool,
}

impl ExGetChild<'_> {
    pub fn include_internal(mut self, include_internal: bool) -> Self {
        self.include_internal = include_internal;
        self
    }

    pub fn done(self) -> Option<Node> {
        call_2(&GET_CHILD, self.node.handle(), self.idx, self.include_internal)
    }
}

#[must_use]
pub struct ExGetChildCount<'a> {
    node: &'a Node,
    include_internal: bool,
}

impl ExGetChildCount<'_> {
    pub fn include_internal(mut self, include_internal: bool) -> Self {
        self.include_internal = include_internal;
        self
    }

    pub fn done(self) -> i32 {
        call_1(&GET_CHILD_COUNT, self.node.handle(), self.include_internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::class_info::EngineClass;
    use crate::bindings::variant::Variant;
    use crate::headless::HeadlessEngine;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_add_child_defaults() {
        let engine = HeadlessEngine::install();
        let parent = Node::new().unwrap();
        let child = Node::new().unwrap();
        parent.add_child(&child);

        let args = engine.last_args(parent.instance_id(), "add_child").unwrap();
        assert_eq!(args[0], Variant::Object(Some(child.instance_id())));
        assert_eq!(args[1], Variant::Bool(false));
        assert_eq!(args[2], Variant::Int(0));

        assert_eq!(parent.get_child_count(), 1);
        assert_eq!(parent.get_child(0), Some(child.clone()));
        assert_eq!(child.get_parent(), Some(parent.clone()));
        parent.free();
        assert!(!engine.is_alive(child.instance_id()));
    }

    #[test]
    fn test_internal_children_are_hidden_by_default() {
        HeadlessEngine::install();
        let parent = Node::new().unwrap();
        let visible = Node::new().unwrap();
        let internal = Node::new().unwrap();
        parent.add_child(&visible);
        parent.add_child_ex(&internal).internal(InternalMode::FRONT).done();

        assert_eq!(parent.get_child_count(), 1);
        assert_eq!(parent.get_child_count_ex().include_internal(true).done(), 2);
        assert_eq!(parent.get_child(0), Some(visible.clone()));
        assert_eq!(
            parent.get_child_ex(0).include_internal(true).done(),
            Some(internal.clone())
        );
        assert_eq!(parent.get_child(-1), Some(visible.clone()));
        assert_eq!(parent.get_child(5), None);
        parent.free();
    }

    #[test]
    fn test_child_signals_carry_the_node() {
        let engine = HeadlessEngine::install();
        let parent = Node::new().unwrap();
        let child = Node::new().unwrap();
        engine.scene_root().add_child(&parent);
        let entered = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&entered);
        let callable = parent.connect_child_entered_tree(move |node| {
            sink.lock().unwrap().push(node.instance_id());
        });

        parent.add_child(&child);
        parent.remove_child(&child);
        parent.disconnect_child_entered_tree(&callable);
        parent.add_child(&child);

        assert_eq!(*entered.lock().unwrap(), vec![child.instance_id()]);
        parent.free();
    }

    #[test]
    fn test_renamed_signal_and_name() {
        let engine = HeadlessEngine::install();
        let node = Node::new().unwrap();
        let renamed = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&renamed);
        node.connect_renamed(move || *counter.lock().unwrap() += 1);

        // Orphan nodes rename silently.
        node.set_name("Player");
        assert_eq!(node.get_name(), "Player");
        assert_eq!(*renamed.lock().unwrap(), 0);

        engine.scene_root().add_child(&node);
        assert!(node.is_inside_tree());
        node.set_name("Hero");
        assert_eq!(node.get_name(), "Hero");
        assert_eq!(*renamed.lock().unwrap(), 1);
        node.free();
    }

    #[test]
    fn test_tree_signals_follow_scene_root() {
        let engine = HeadlessEngine::install();
        let parent = Node::new().unwrap();
        let child = Node::new().unwrap();
        parent.add_child(&child);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        child.connect_tree_entered(move || sink.lock().unwrap().push("entered"));
        let sink = Arc::clone(&events);
        child.connect_ready(move || sink.lock().unwrap().push("ready"));
        let sink = Arc::clone(&events);
        child.connect_tree_exiting(move || sink.lock().unwrap().push("exiting"));

        assert!(!child.is_inside_tree());
        engine.scene_root().add_child(&parent);
        assert!(child.is_inside_tree());
        engine.scene_root().remove_child(&parent);
        engine.scene_root().add_child(&parent);

        assert_eq!(
            *events.lock().unwrap(),
            vec!["entered", "ready", "exiting", "entered"]
        );
        parent.free();
        assert!(!engine.is_alive(child.instance_id()));
    }

    #[test]
    fn test_queue_free_waits_for_frame_end() {
        let engine = HeadlessEngine::install();
        let node = Node::new().unwrap();
        let id = node.instance_id();
        node.queue_free();
        assert!(engine.is_alive(id));
        engine.process_frame();
        assert!(!engine.is_alive(id));
    }
}
