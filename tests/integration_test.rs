use engine_bindings::classes::mesh::ArrayType;
use engine_bindings::classes::{
    ArrayMesh, AudioStream, AudioStreamPlayer, Geometry2D, Node, Node2D, PlaceholderTexture2D,
    PrimitiveType, RefCounted, Sprite2D, TlsOptions, WebSocketState, WebSocketPeer, X509Certificate,
};
use engine_bindings::bindings::{ClassInfo, EngineClass, StringName, Variant, VariantArray};
use engine_bindings::headless::HeadlessEngine;
use glam::{IVec2, Vec2, Vec3};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn quad_arrays() -> VariantArray {
    let mut arrays = vec![Variant::Nil; ArrayType::MAX.ord() as usize];
    arrays[ArrayType::VERTEX.ord() as usize] = Variant::PackedVector3Array(vec![
        Vec3::new(-1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, -1.0),
        Vec3::new(1.0, 0.0, 1.0),
        Vec3::new(-1.0, 0.0, 1.0),
    ]);
    arrays[ArrayType::INDEX.ord() as usize] = Variant::PackedInt32Array(vec![0, 1, 2, 0, 2, 3]);
    arrays
}

#[test]
fn test_array_mesh_surface_lifecycle() {
    HeadlessEngine::install();
    let mesh = ArrayMesh::new().unwrap();
    assert_eq!(mesh.get_surface_count(), 0);

    mesh.add_surface_from_arrays(PrimitiveType::TRIANGLES, quad_arrays());
    mesh.surface_set_name(0, "floor");

    assert_eq!(mesh.get_surface_count(), 1);
    assert_eq!(mesh.surface_get_primitive_type(0), PrimitiveType::TRIANGLES);
    assert_eq!(mesh.surface_get_array_len(0), 4);
    assert_eq!(mesh.surface_find_by_name("floor"), 0);
    let aabb = mesh.get_aabb();
    assert_eq!(aabb.position, Vec3::new(-1.0, 0.0, -1.0));
    assert_eq!(aabb.size, Vec3::new(2.0, 0.0, 2.0));

    let arrays = mesh.surface_get_arrays(0);
    assert_eq!(arrays.len(), ArrayType::MAX.ord() as usize);
    assert_eq!(arrays[ArrayType::INDEX.ord() as usize], Variant::PackedInt32Array(vec![0, 1, 2, 0, 2, 3]));
}

#[test]
fn test_default_arguments_reach_the_engine() {
    let engine = HeadlessEngine::install();
    let root = engine.scene_root();
    let node = Node::new().unwrap();
    root.add_child(&node);

    let args = engine.last_args(root.instance_id(), "add_child").unwrap();
    assert_eq!(
        args,
        vec![Variant::Object(Some(node.instance_id())), Variant::Bool(false), Variant::Int(0)]
    );
    root.remove_child(&node);
    node.free();
}

proptest! {
    #[test]
    fn test_node_2d_position_round_trip(x in -1.0e6f32..1.0e6, y in -1.0e6f32..1.0e6) {
        HeadlessEngine::install();
        let node = Node2D::new().unwrap();
        node.set_position(Vec2::new(x, y));
        prop_assert_eq!(node.get_position(), Vec2::new(x, y));
        node.free();
    }
}

#[test]
fn test_sprite_frame_changes() {
    HeadlessEngine::install();
    let sprite = Sprite2D::new().unwrap();
    let texture = PlaceholderTexture2D::new().unwrap();
    texture.set_size(Vec2::new(128.0, 64.0));
    sprite.set_texture(Some(&texture));
    sprite.set_hframes(4);
    sprite.set_vframes(2);

    let changes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&changes);
    sprite.connect_frame_changed(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    sprite.set_frame_coords(IVec2::new(10, 10));
    assert_eq!(sprite.get_frame_coords(), IVec2::new(3, 1));
    assert_eq!(sprite.get_frame(), 7);
    assert!(changes.load(Ordering::SeqCst) >= 1);
    assert_eq!(sprite.get_rect().size, Vec2::new(32.0, 32.0));
    sprite.free();
}

#[test]
fn test_reference_counted_ownership() {
    let engine = HeadlessEngine::install();
    let counted = RefCounted::new().unwrap();
    let id = counted.instance_id();
    assert_eq!(engine.reference_count(id), Some(1));

    let clones: Vec<_> = (0..3).map(|_| counted.clone()).collect();
    assert_eq!(counted.get_reference_count(), 4);
    drop(clones);
    assert_eq!(counted.get_reference_count(), 1);

    drop(counted);
    assert!(!engine.is_alive(id));
}

#[test]
fn test_node_outlives_its_wrapper_until_freed() {
    let engine = HeadlessEngine::install();
    let node = Node::new().unwrap();
    let id = node.instance_id();
    drop(node);
    assert!(engine.is_alive(id));

    Node::from_object_unchecked(engine_bindings::classes::Object::from_id(id)).free();
    assert!(!engine.is_alive(id));
}

#[test]
fn test_signal_fires_until_disconnected() {
    let engine = HeadlessEngine::install();
    let root = engine.scene_root();
    let parent = Node::new().unwrap();
    root.add_child(&parent);

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let callable = parent.connect_child_entered_tree(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let first = Node::new().unwrap();
    parent.add_child(&first);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    parent.disconnect_child_entered_tree(&callable);
    assert_eq!(engine.connection_count(parent.instance_id(), "child_entered_tree"), 0);
    let second = Node::new().unwrap();
    parent.add_child(&second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    root.remove_child(&parent);
    parent.free();
}

#[test]
fn test_method_binds_resolve_once() {
    let engine = HeadlessEngine::install();
    for _ in 0..3 {
        let node = Node2D::new().unwrap();
        node.set_rotation(0.5);
        node.translate(Vec2::ONE);
        node.free();
    }
    assert_eq!(engine.resolution_count("Node2D", "set_rotation"), 1);
    assert_eq!(engine.resolution_count("Node2D", "translate"), 1);
}

#[test]
fn test_declared_names_walk_the_class_chain() {
    HeadlessEngine::install();
    let info: &ClassInfo = Sprite2D::class_info();
    assert!(info.has_method(&StringName::new("set_frame")));
    assert!(info.has_method(&StringName::new("add_child")));
    assert!(info.has_property(&StringName::new("position")));
    assert!(info.has_signal(&StringName::new("tree_entered")));
    assert!(!info.has_method(&StringName::new("play")));
    assert!(info.inherits("CanvasItem"));
    assert!(!info.inherits("Resource"));
}

#[test]
fn test_geometry_queries() {
    HeadlessEngine::install();
    let geometry = Geometry2D::singleton().unwrap();
    let square = [
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(0.0, 2.0),
    ];

    assert!(geometry.is_point_in_polygon(Vec2::new(1.0, 1.0), &square));
    assert!(!geometry.is_point_in_polygon(Vec2::new(3.0, 1.0), &square));
    assert_eq!(
        geometry.segment_intersects_segment(
            Vec2::ZERO,
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0),
        ),
        Some(Vec2::new(1.0, 1.0))
    );
    let hull = geometry.convex_hull(&[square[0], square[1], Vec2::new(1.0, 1.0), square[2], square[3]]);
    assert_eq!(hull.len(), 5);
    assert!(!hull.contains(&Vec2::new(1.0, 1.0)));
}

#[test]
fn test_websocket_loopback() {
    HeadlessEngine::install();
    let peer = WebSocketPeer::new().unwrap();
    peer.set_supported_protocols(vec!["chat".to_string()]);
    assert!(peer.connect_to_url("wss://example.com/socket").is_ok());
    peer.poll();

    assert_eq!(peer.get_ready_state(), WebSocketState::OPEN);
    assert_eq!(peer.get_connected_port(), 443);
    assert_eq!(peer.get_selected_protocol(), "chat");

    assert!(peer.put_var(Variant::Int(42)).is_ok());
    peer.poll();
    assert_eq!(peer.get_var(), Variant::Int(42));

    peer.close();
    peer.poll();
    assert_eq!(peer.get_ready_state(), WebSocketState::CLOSED);
}

#[test]
fn test_tree_notifications_under_scene_root() {
    let engine = HeadlessEngine::install();
    let parent = Node::new().unwrap();
    let child = Node::new().unwrap();
    parent.add_child(&child);

    let events = Arc::new(Mutex::new(Vec::new()));
    for (node, label) in [(&parent, "parent"), (&child, "child")] {
        let sink = Arc::clone(&events);
        node.connect_ready(move || sink.lock().unwrap().push(label));
    }

    assert!(!child.is_inside_tree());
    engine.scene_root().add_child(&parent);
    assert!(child.is_inside_tree());
    assert_eq!(*events.lock().unwrap(), vec!["child", "parent"]);

    let parent_id = parent.instance_id();
    parent.queue_free();
    assert!(engine.is_alive(parent_id));
    engine.process_frame();
    assert!(!engine.is_alive(parent_id));
    assert!(!engine.is_alive(child.instance_id()));
}

#[test]
fn test_audio_player_finishes() {
    let engine = HeadlessEngine::install();
    let root = engine.scene_root();
    let player = AudioStreamPlayer::new().unwrap();
    let stream = AudioStream::new().unwrap();
    player.set_stream(Some(&stream));
    root.add_child(&player);

    let finished = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&finished);
    player.connect_finished(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    player.play();
    assert!(player.is_playing());
    engine.finish_playback(player.instance_id());
    assert!(!player.is_playing());
    assert_eq!(finished.load(Ordering::SeqCst), 1);

    root.remove_child(&player);
    player.free();
}

#[test]
fn test_duplicate_mesh_drops_path() {
    let engine = HeadlessEngine::install();
    let mesh = ArrayMesh::new().unwrap();
    mesh.add_surface_from_arrays(PrimitiveType::TRIANGLES, quad_arrays());
    mesh.set_resource_name("floor");
    mesh.set_resource_path("res://floor.tres");

    let copy = mesh.duplicate_ex().subresources(true).done().unwrap();
    assert_eq!(
        engine.last_args(mesh.instance_id(), "duplicate"),
        Some(vec![Variant::Bool(true)])
    );
    assert_ne!(copy.instance_id(), mesh.instance_id());
    assert_eq!(copy.get_resource_name(), "floor");
    assert_eq!(copy.get_resource_path(), "");
    assert_eq!(mesh.get_resource_path(), "res://floor.tres");

    let copied_mesh = copy.try_cast::<ArrayMesh>().unwrap();
    drop(copy);
    assert_eq!(copied_mesh.get_surface_count(), 1);
    assert_eq!(copied_mesh.get_reference_count(), 1);
}

#[test]
fn test_tls_options_keep_trusted_chain_alive() {
    let engine = HeadlessEngine::install();
    let certificate = X509Certificate::new().unwrap();
    let pem = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----";
    assert!(certificate.load_from_string(pem).is_ok());
    let certificate_id = certificate.instance_id();

    let options = TlsOptions::client_ex()
        .trusted_chain(&certificate)
        .common_name_override("example.com")
        .done()
        .unwrap();
    assert!(!options.is_unsafe_client());
    assert_eq!(options.get_reference_count(), 1);
    assert_eq!(engine.reference_count(certificate_id), Some(2));

    drop(certificate);
    assert!(engine.is_alive(certificate_id));

    let options_id = options.instance_id();
    drop(options);
    assert!(!engine.is_alive(options_id));
    assert!(!engine.is_alive(certificate_id));
}
