//! Scene tree: nodes, canvas items, sprites and audio players.
//!
//! Tree signals (`tree_entered`, `ready`, `renamed`, child notifications,
//! visibility changes) fire only for nodes inside the tree, i.e. below the
//! scene root.

use super::classdb::ClassDef;
use super::{arg, lock, HeadlessEngine};
use crate::bindings::backend::ObjectId;
use crate::bindings::string_name::StringName;
use crate::bindings::variant::{Color, Rect2, Variant};
use glam::{IVec2, Vec2};

pub(super) fn register(classes: &mut Vec<ClassDef>) {
    classes.push(
        ClassDef::new("Node", Some("Object"))
            .instantiable()
            .method("set_name", 3304788590, NodeService::set_name)
            .method("get_name", 2002593661, NodeService::get_name)
            .method("add_child", 3863233950, NodeService::add_child)
            .method("remove_child", 1078189570, NodeService::remove_child)
            .method("get_child", 541253412, NodeService::get_child)
            .method("get_child_count", 894402480, NodeService::get_child_count)
            .method("get_parent", 3160264692, |engine, id, _| {
                Variant::Object(engine.with_state(id, |state| state.node.parent).flatten())
            })
            .method("is_inside_tree", 36873697, |engine, id, _| {
                Variant::Bool(NodeService::is_inside_tree(engine, id))
            })
            .method("queue_free", 3218959716, NodeService::queue_free)
            .property_with(
                "name",
                || Variant::StringName(StringName::default()),
                Some("set_name"),
                Some("get_name"),
            )
            .signals(&[
                "ready",
                "renamed",
                "tree_entered",
                "tree_exiting",
                "child_entered_tree",
                "child_exiting_tree",
            ]),
    );

    classes.push(
        ClassDef::new("CanvasItem", Some("Node"))
            .method("set_visible", 2586408642, CanvasItemService::set_visible)
            .method("is_visible", 36873697, |engine, id, _| {
                Variant::Bool(CanvasItemService::is_visible(engine, id))
            })
            .method("show", 3218959716, |engine, id, _| {
                CanvasItemService::set_visible(engine, id, &[Variant::Bool(true)])
            })
            .method("hide", 3218959716, |engine, id, _| {
                CanvasItemService::set_visible(engine, id, &[Variant::Bool(false)])
            })
            .method("is_visible_in_tree", 36873697, CanvasItemService::is_visible_in_tree)
            .method("queue_redraw", 3218959716, CanvasItemService::queue_redraw)
            .property_with("visible", || Variant::Bool(true), Some("set_visible"), Some("is_visible"))
            .property(
                "modulate",
                || Variant::Color(Color::WHITE),
                ("set_modulate", 2920490490),
                ("get_modulate", 3444240500),
            )
            .signals(&["draw", "visibility_changed", "hidden"]),
    );

    classes.push(
        ClassDef::new("Node2D", Some("CanvasItem"))
            .instantiable()
            .property(
                "position",
                || Variant::Vector2(Vec2::ZERO),
                ("set_position", 743155724),
                ("get_position", 3341600327),
            )
            .property(
                "rotation",
                || Variant::Float(0.0),
                ("set_rotation", 373806689),
                ("get_rotation", 1740695150),
            )
            .property(
                "scale",
                || Variant::Vector2(Vec2::ONE),
                ("set_scale", 743155724),
                ("get_scale", 3341600327),
            )
            .property(
                "skew",
                || Variant::Float(0.0),
                ("set_skew", 373806689),
                ("get_skew", 1740695150),
            )
            .method("rotate", 373806689, |engine, id, args| {
                let rotation: f64 = engine.property(id, "rotation").to();
                let radians: f64 = arg(args, 0);
                engine.store_property(id, "rotation", Variant::Float(rotation + radians));
                Variant::Nil
            })
            .method("translate", 743155724, |engine, id, args| {
                let position: Vec2 = engine.property(id, "position").to();
                let offset: Vec2 = arg(args, 0);
                engine.store_property(id, "position", Variant::Vector2(position + offset));
                Variant::Nil
            }),
    );

    classes.push(
        ClassDef::new("Sprite2D", Some("Node2D"))
            .instantiable()
            .method("set_texture", 4051416890, SpriteService::set_texture)
            .method("get_texture", 3635182373, |engine, id, _| engine.property(id, "texture"))
            .property_with("texture", || Variant::Object(None), Some("set_texture"), Some("get_texture"))
            .property("centered", || Variant::Bool(true), ("set_centered", 2586408642), ("is_centered", 36873697))
            .property(
                "offset",
                || Variant::Vector2(Vec2::ZERO),
                ("set_offset", 743155724),
                ("get_offset", 3341600327),
            )
            .property("flip_h", || Variant::Bool(false), ("set_flip_h", 2586408642), ("is_flipped_h", 36873697))
            .property("flip_v", || Variant::Bool(false), ("set_flip_v", 2586408642), ("is_flipped_v", 36873697))
            .method("set_hframes", 1286410249, |engine, id, args| {
                SpriteService::set_frames(engine, id, "hframes", arg(args, 0))
            })
            .method("get_hframes", 3905245786, |engine, id, _| engine.property(id, "hframes"))
            .property_with("hframes", || Variant::Int(1), Some("set_hframes"), Some("get_hframes"))
            .method("set_vframes", 1286410249, |engine, id, args| {
                SpriteService::set_frames(engine, id, "vframes", arg(args, 0))
            })
            .method("get_vframes", 3905245786, |engine, id, _| engine.property(id, "vframes"))
            .property_with("vframes", || Variant::Int(1), Some("set_vframes"), Some("get_vframes"))
            .method("set_frame", 1286410249, SpriteService::set_frame)
            .method("get_frame", 3905245786, |engine, id, _| engine.property(id, "frame"))
            .property_with("frame", || Variant::Int(0), Some("set_frame"), Some("get_frame"))
            .method("set_frame_coords", 1130785943, SpriteService::set_frame_coords)
            .method("get_frame_coords", 3690982128, SpriteService::get_frame_coords)
            .property_with(
                "frame_coords",
                || Variant::Vector2i(IVec2::ZERO),
                Some("set_frame_coords"),
                Some("get_frame_coords"),
            )
            .property(
                "region_enabled",
                || Variant::Bool(false),
                ("set_region_enabled", 2586408642),
                ("is_region_enabled", 36873697),
            )
            .property(
                "region_rect",
                || Variant::Rect2(Rect2::default()),
                ("set_region_rect", 2046264180),
                ("get_region_rect", 1639390495),
            )
            .method("get_rect", 1639390495, SpriteService::get_rect)
            .signals(&["frame_changed", "texture_changed"]),
    );

    classes.push(
        ClassDef::new("AudioStreamPlayer", Some("Node"))
            .instantiable()
            .method("set_stream", 2210767741, AudioService::set_stream)
            .method("get_stream", 160907539, |engine, id, _| engine.property(id, "stream"))
            .property_with("stream", || Variant::Object(None), Some("set_stream"), Some("get_stream"))
            .property("volume_db", || Variant::Float(0.0), ("set_volume_db", 373806689), ("get_volume_db", 1740695150))
            .method("set_pitch_scale", 373806689, AudioService::set_pitch_scale)
            .method("get_pitch_scale", 1740695150, |engine, id, _| engine.property(id, "pitch_scale"))
            .property_with("pitch_scale", || Variant::Float(1.0), Some("set_pitch_scale"), Some("get_pitch_scale"))
            .property(
                "autoplay",
                || Variant::Bool(false),
                ("set_autoplay", 2586408642),
                ("is_autoplay_enabled", 36873697),
            )
            .property(
                "stream_paused",
                || Variant::Bool(false),
                ("set_stream_paused", 2586408642),
                ("get_stream_paused", 36873697),
            )
            .property(
                "bus",
                || Variant::StringName(StringName::new("Master")),
                ("set_bus", 3304788590),
                ("get_bus", 2002593661),
            )
            .property("mix_target", || Variant::Int(0), ("set_mix_target", 2300306138), ("get_mix_target", 172807476))
            .property(
                "max_polyphony",
                || Variant::Int(1),
                ("set_max_polyphony", 1286410249),
                ("get_max_polyphony", 3905245786),
            )
            .method("play", 1958160172, |engine, id, args| {
                AudioService::play(engine, id, arg(args, 0));
                Variant::Nil
            })
            .method("seek", 373806689, AudioService::seek)
            .method("stop", 3218959716, |engine, id, _| {
                AudioService::stop(engine, id);
                Variant::Nil
            })
            .method("is_playing", 36873697, |engine, id, _| {
                Variant::Bool(engine.with_state(id, |state| state.playback.playing).unwrap_or(false))
            })
            .method("get_playback_position", 191475506, |engine, id, _| {
                let position = engine
                    .with_state(id, |state| {
                        if state.playback.playing {
                            state.playback.position
                        } else {
                            0.0
                        }
                    })
                    .unwrap_or(0.0);
                Variant::Float(position)
            })
            .signals(&["finished"]),
    );
}

/// Creates the scene root: a `Node` named `root`, already inside the tree.
pub(super) fn create_root(engine: &HeadlessEngine) -> ObjectId {
    let class = engine.classes().index_of("Node").unwrap_or_default();
    let id = engine.create_object(class);
    engine.with_state(id, |state| {
        state
            .properties
            .insert("name".to_string(), Variant::StringName(StringName::new("root")));
        state.node.inside_tree = true;
        state.node.ready_emitted = true;
    });
    tracing::debug!(target: "headless", id = id.raw(), "Scene root created");
    id
}

/// Detaches a node that is about to be destroyed and frees its children.
pub(super) fn release_node(engine: &HeadlessEngine, id: ObjectId) {
    let Some((parent, children)) = engine.with_state(id, |state| {
        let children: Vec<ObjectId> = state.node.children.iter().map(|(child, _)| *child).collect();
        (state.node.parent, children)
    }) else {
        return;
    };
    if let Some(parent) = parent {
        NodeService::detach(engine, parent, id);
    }
    for child in children.into_iter().rev() {
        engine.destroy(child);
    }
}

/// 帧结束：执行重绘，删除排队释放的节点
pub(super) fn process_frame(engine: &HeadlessEngine) {
    let (mut redraw, mut queued) = {
        let mut objects = lock(&engine.objects);
        let mut redraw = Vec::new();
        let mut queued = Vec::new();
        for (id, state) in objects.iter_mut() {
            if std::mem::take(&mut state.node.redraw_pending) {
                redraw.push(*id);
            }
            if state.node.queued_for_deletion {
                queued.push(*id);
            }
        }
        (redraw, queued)
    };
    redraw.sort();
    queued.sort();

    for id in redraw {
        engine.emit_signal(id, "draw", &[]);
    }
    for id in queued {
        // A queued ancestor may already have taken this node with it.
        if engine.is_alive(id) {
            engine.destroy(id);
        }
    }
}

pub(super) fn finish_playback(engine: &HeadlessEngine, player: ObjectId) {
    let was_playing = engine
        .with_state(player, |state| std::mem::take(&mut state.playback.playing))
        .unwrap_or(false);
    if was_playing {
        engine.with_state(player, |state| state.playback.position = 0.0);
        engine.emit_signal(player, "finished", &[]);
    }
}

/// 节点服务 - 场景树结构与树信号
pub struct NodeService;

impl NodeService {
    fn is_inside_tree(engine: &HeadlessEngine, id: ObjectId) -> bool {
        engine.with_state(id, |state| state.node.inside_tree).unwrap_or(false)
    }

    fn name(engine: &HeadlessEngine, id: ObjectId) -> StringName {
        engine.property(id, "name").to()
    }

    fn child_ids(engine: &HeadlessEngine, id: ObjectId) -> Vec<ObjectId> {
        engine
            .with_state(id, |state| state.node.children.iter().map(|(child, _)| *child).collect())
            .unwrap_or_default()
    }

    fn set_name(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let name: String = arg(args, 0);
        if name.is_empty() {
            tracing::error!(target: "headless", id = id.raw(), "Node name can't be empty");
            return Variant::Nil;
        }
        engine.store_property(id, "name", Variant::StringName(StringName::new(&name)));
        if Self::is_inside_tree(engine, id) {
            engine.emit_signal(id, "renamed", &[]);
        }
        Variant::Nil
    }

    fn get_name(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        Variant::StringName(Self::name(engine, id))
    }

    /// 无名子节点：`@Class@id`；可读名称与兄弟重名时追加数字
    fn assign_name(engine: &HeadlessEngine, parent: ObjectId, child: ObjectId, force_readable: bool) {
        let current = Self::name(engine, child);
        let base = if current.is_empty() {
            let class = engine
                .class_of(child)
                .map(|index| engine.classes().class(index).name)
                .unwrap_or("Node");
            if !force_readable {
                let name = format!("@{}@{}", class, child.raw());
                engine.store_property(child, "name", Variant::StringName(StringName::new(&name)));
                return;
            }
            class.to_string()
        } else {
            current.as_str().to_string()
        };

        let siblings: Vec<StringName> = Self::child_ids(engine, parent)
            .into_iter()
            .map(|sibling| Self::name(engine, sibling))
            .collect();
        let taken = |candidate: &str| siblings.iter().any(|name| name == candidate);
        let mut unique = base.clone();
        let mut suffix = 2;
        while taken(&unique) {
            unique = format!("{base}{suffix}");
            suffix += 1;
        }
        engine.store_property(child, "name", Variant::StringName(StringName::new(&unique)));
    }

    fn add_child(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let Some(child) = arg::<Option<ObjectId>>(args, 0) else {
            tracing::error!(target: "headless", "Can't add a null child");
            return Variant::Nil;
        };
        let force_readable: bool = arg(args, 1);
        let internal: i64 = arg(args, 2);

        if child == id || !engine.is_instance_of(child, "Node") {
            tracing::error!(target: "headless", parent = id.raw(), child = child.raw(), "Invalid child node");
            return Variant::Nil;
        }
        if engine.with_state(child, |state| state.node.parent).flatten().is_some() {
            tracing::error!(target: "headless", child = child.raw(), "Child already has a parent");
            return Variant::Nil;
        }
        let mut ancestor = Some(id);
        while let Some(current) = ancestor {
            if current == child {
                tracing::error!(target: "headless", child = child.raw(), "Can't add an ancestor as a child");
                return Variant::Nil;
            }
            ancestor = engine.with_state(current, |state| state.node.parent).flatten();
        }

        Self::assign_name(engine, id, child, force_readable);
        engine.with_state(id, |state| state.node.children.push((child, internal)));
        engine.with_state(child, |state| state.node.parent = Some(id));

        if Self::is_inside_tree(engine, id) {
            Self::propagate_enter_tree(engine, child);
            Self::propagate_ready(engine, child);
        }
        Variant::Nil
    }

    fn remove_child(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let child: Option<ObjectId> = arg(args, 0);
        match child {
            Some(child) if engine.with_state(child, |state| state.node.parent).flatten() == Some(id) => {
                Self::detach(engine, id, child);
            }
            _ => tracing::error!(target: "headless", parent = id.raw(), "Node is not a child of this parent"),
        }
        Variant::Nil
    }

    fn detach(engine: &HeadlessEngine, parent: ObjectId, child: ObjectId) {
        if Self::is_inside_tree(engine, child) {
            Self::propagate_exit_tree(engine, child);
        }
        engine.with_state(parent, |state| state.node.children.retain(|(id, _)| *id != child));
        engine.with_state(child, |state| state.node.parent = None);
    }

    fn propagate_enter_tree(engine: &HeadlessEngine, id: ObjectId) {
        let Some(parent) = engine.with_state(id, |state| {
            state.node.inside_tree = true;
            state.node.parent
        }) else {
            return;
        };
        engine.emit_signal(id, "tree_entered", &[]);
        AudioService::autoplay(engine, id);
        if let Some(parent) = parent {
            engine.emit_signal(parent, "child_entered_tree", &[Variant::Object(Some(id))]);
        }
        for child in Self::child_ids(engine, id) {
            Self::propagate_enter_tree(engine, child);
        }
    }

    /// 子节点先于父节点，每个节点只触发一次
    fn propagate_ready(engine: &HeadlessEngine, id: ObjectId) {
        for child in Self::child_ids(engine, id) {
            Self::propagate_ready(engine, child);
        }
        let first = engine
            .with_state(id, |state| !std::mem::replace(&mut state.node.ready_emitted, true))
            .unwrap_or(false);
        if first {
            engine.emit_signal(id, "ready", &[]);
        }
    }

    fn propagate_exit_tree(engine: &HeadlessEngine, id: ObjectId) {
        for child in Self::child_ids(engine, id).into_iter().rev() {
            Self::propagate_exit_tree(engine, child);
        }
        engine.emit_signal(id, "tree_exiting", &[]);
        if let Some(parent) = engine.with_state(id, |state| state.node.parent).flatten() {
            engine.emit_signal(parent, "child_exiting_tree", &[Variant::Object(Some(id))]);
        }
        engine.with_state(id, |state| {
            state.node.inside_tree = false;
            state.node.redraw_pending = false;
        });
        if engine.is_instance_of(id, "AudioStreamPlayer") {
            AudioService::stop(engine, id);
        }
    }

    /// 前置内部子节点、普通子节点、后置内部子节点
    fn ordered_children(engine: &HeadlessEngine, id: ObjectId, include_internal: bool) -> Vec<ObjectId> {
        let children = engine
            .with_state(id, |state| state.node.children.clone())
            .unwrap_or_default();
        let pick = |mode: i64| {
            children
                .iter()
                .filter(move |(_, internal)| *internal == mode)
                .map(|(child, _)| *child)
        };
        if include_internal {
            pick(1).chain(pick(0)).chain(pick(2)).collect()
        } else {
            pick(0).collect()
        }
    }

    fn get_child(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let idx: i64 = arg(args, 0);
        let include_internal: bool = arg(args, 1);
        let children = Self::ordered_children(engine, id, include_internal);
        let index = if idx < 0 { idx + children.len() as i64 } else { idx };
        let child = usize::try_from(index).ok().and_then(|index| children.get(index).copied());
        if child.is_none() {
            tracing::error!(target: "headless", idx, count = children.len(), "Child index out of range");
        }
        Variant::Object(child)
    }

    fn get_child_count(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let include_internal: bool = arg(args, 0);
        Variant::Int(Self::ordered_children(engine, id, include_internal).len() as i64)
    }

    fn queue_free(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        engine.with_state(id, |state| state.node.queued_for_deletion = true);
        Variant::Nil
    }
}

/// 画布项服务 - 可见性与重绘
pub struct CanvasItemService;

impl CanvasItemService {
    fn is_visible(engine: &HeadlessEngine, id: ObjectId) -> bool {
        engine.property(id, "visible").to()
    }

    fn set_visible(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let visible: bool = arg(args, 0);
        if Self::is_visible(engine, id) == visible {
            return Variant::Nil;
        }
        engine.store_property(id, "visible", Variant::Bool(visible));
        if NodeService::is_inside_tree(engine, id) {
            if !visible {
                engine.emit_signal(id, "hidden", &[]);
            }
            Self::propagate_visibility_changed(engine, id);
        }
        Variant::Nil
    }

    fn propagate_visibility_changed(engine: &HeadlessEngine, id: ObjectId) {
        engine.emit_signal(id, "visibility_changed", &[]);
        for child in NodeService::child_ids(engine, id) {
            if engine.is_instance_of(child, "CanvasItem") && Self::is_visible(engine, child) {
                Self::propagate_visibility_changed(engine, child);
            }
        }
    }

    /// 自身和所有画布项祖先都可见，且在场景树内
    fn is_visible_in_tree(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        if !NodeService::is_inside_tree(engine, id) {
            return Variant::Bool(false);
        }
        let mut current = Some(id);
        while let Some(node) = current {
            if !engine.is_instance_of(node, "CanvasItem") {
                break;
            }
            if !Self::is_visible(engine, node) {
                return Variant::Bool(false);
            }
            current = engine.with_state(node, |state| state.node.parent).flatten();
        }
        Variant::Bool(true)
    }

    fn queue_redraw(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        engine.with_state(id, |state| {
            if state.node.inside_tree {
                state.node.redraw_pending = true;
            }
        });
        Variant::Nil
    }
}

/// 精灵服务 - 帧动画网格与矩形
pub struct SpriteService;

impl SpriteService {
    fn frames(engine: &HeadlessEngine, id: ObjectId) -> (i64, i64) {
        let hframes: i64 = engine.property(id, "hframes").to();
        let vframes: i64 = engine.property(id, "vframes").to();
        (hframes.max(1), vframes.max(1))
    }

    fn set_texture(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let texture: Option<ObjectId> = arg(args, 0);
        if engine.store_object_property(id, "texture", texture) {
            engine.emit_signal(id, "texture_changed", &[]);
        }
        Variant::Nil
    }

    /// 帧总数；超出 i32 时为 None
    fn frame_count(hframes: i64, vframes: i64) -> Option<i64> {
        hframes.checked_mul(vframes).filter(|count| *count <= i64::from(i32::MAX))
    }

    fn set_frames(engine: &HeadlessEngine, id: ObjectId, property: &'static str, amount: i64) -> Variant {
        if !(1..=i64::from(i32::MAX)).contains(&amount) {
            tracing::error!(target: "headless", property, amount, "Sprite sheet dimension must be in 1..=i32::MAX");
            return Variant::Nil;
        }
        let (hframes, vframes) = Self::frames(engine, id);
        let (hframes, vframes) = if property == "hframes" { (amount, vframes) } else { (hframes, amount) };
        let Some(count) = Self::frame_count(hframes, vframes) else {
            tracing::error!(target: "headless", hframes, vframes, "Sprite sheet has too many frames");
            return Variant::Nil;
        };
        engine.store_property(id, property, Variant::Int(amount));
        let frame: i64 = engine.property(id, "frame").to();
        if frame >= count {
            engine.store_property(id, "frame", Variant::Int(0));
        }
        Variant::Nil
    }

    fn set_frame(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let frame: i64 = arg(args, 0);
        let (hframes, vframes) = Self::frames(engine, id);
        let count = Self::frame_count(hframes, vframes).unwrap_or(0);
        if !(0..count).contains(&frame) {
            tracing::error!(target: "headless", frame, count, "Frame index out of range");
            return Variant::Nil;
        }
        engine.store_property(id, "frame", Variant::Int(frame));
        engine.emit_signal(id, "frame_changed", &[]);
        Variant::Nil
    }

    /// 坐标被限制在精灵表范围内
    fn set_frame_coords(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let coords: IVec2 = arg(args, 0);
        let (hframes, vframes) = Self::frames(engine, id);
        let x = i64::from(coords.x).clamp(0, hframes - 1);
        let y = i64::from(coords.y).clamp(0, vframes - 1);
        let frame = y.saturating_mul(hframes).saturating_add(x);
        Self::set_frame(engine, id, &[Variant::Int(frame)])
    }

    fn get_frame_coords(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let (hframes, _) = Self::frames(engine, id);
        let frame: i64 = engine.property(id, "frame").to();
        Variant::Vector2i(IVec2::new((frame % hframes) as i32, (frame / hframes) as i32))
    }

    fn get_rect(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let texture: Option<ObjectId> = engine.property(id, "texture").to();
        let Some(texture) = texture.filter(|texture| engine.is_alive(*texture)) else {
            return Variant::Rect2(Rect2::new(Vec2::ZERO, Vec2::ONE));
        };

        let region_enabled: bool = engine.property(id, "region_enabled").to();
        let mut size: Vec2 = if region_enabled {
            engine.property(id, "region_rect").to::<Rect2>().size
        } else {
            engine.call_method(texture, "get_size", &[]).to()
        };
        let (hframes, vframes) = Self::frames(engine, id);
        size /= Vec2::new(hframes as f32, vframes as f32);

        let mut offset: Vec2 = engine.property(id, "offset").to();
        if engine.property(id, "centered").to::<bool>() {
            offset -= size / 2.0;
        }
        Variant::Rect2(Rect2::new(offset, size))
    }
}

/// 音频播放服务
pub struct AudioService;

impl AudioService {
    fn set_stream(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let stream: Option<ObjectId> = arg(args, 0);
        if engine.store_object_property(id, "stream", stream) {
            Self::stop(engine, id);
        }
        Variant::Nil
    }

    fn set_pitch_scale(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let pitch: f64 = arg(args, 0);
        if pitch <= 0.0 {
            tracing::error!(target: "headless", pitch, "Pitch scale must be positive");
            return Variant::Nil;
        }
        engine.store_property(id, "pitch_scale", Variant::Float(pitch));
        Variant::Nil
    }

    /// 没有音频流时不播放
    fn play(engine: &HeadlessEngine, id: ObjectId, from_position: f64) {
        let stream: Option<ObjectId> = engine.property(id, "stream").to();
        if stream.is_none() {
            tracing::warn!(target: "headless", id = id.raw(), "Playing without a stream");
            return;
        }
        engine.with_state(id, |state| {
            state.playback.playing = true;
            state.playback.position = from_position.max(0.0);
        });
    }

    fn seek(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let position: f64 = arg(args, 0);
        engine.with_state(id, |state| {
            if state.playback.playing {
                state.playback.position = position.max(0.0);
            }
        });
        Variant::Nil
    }

    fn stop(engine: &HeadlessEngine, id: ObjectId) {
        engine.with_state(id, |state| {
            state.playback.playing = false;
            state.playback.position = 0.0;
        });
    }

    fn autoplay(engine: &HeadlessEngine, id: ObjectId) {
        if engine.is_instance_of(id, "AudioStreamPlayer") && engine.property(id, "autoplay").to::<bool>() {
            Self::play(engine, id, 0.0);
        }
    }
}
