//! Mesh and texture resources.

use super::classdb::ClassDef;
use super::state::Surface;
use super::{arg, HeadlessEngine};
use crate::bindings::backend::ObjectId;
use crate::bindings::string_name::StringName;
use crate::bindings::variant::{Aabb, VariantArray, Variant};
use glam::{IVec2, Vec2, Vec3};

/// 表面数组槽位数
const ARRAY_MAX: usize = 13;
const ARRAY_VERTEX: usize = 0;
const FLAG_USE_2D_VERTICES: i64 = 1 << 25;

pub(super) fn register(classes: &mut Vec<ClassDef>) {
    classes.push(
        ClassDef::new("Mesh", Some("Resource"))
            .method("get_surface_count", 3905245786, MeshService::get_surface_count)
            .method("surface_get_primitive_type", 4141943888, MeshService::surface_get_primitive_type)
            .method("surface_get_arrays", 663333327, MeshService::surface_get_arrays)
            .method("surface_get_array_len", 923996154, MeshService::surface_get_array_len)
            .method("get_aabb", 1068685055, MeshService::get_aabb)
            .property(
                "lightmap_size_hint",
                || Variant::Vector2i(IVec2::ZERO),
                ("set_lightmap_size_hint", 1130785943),
                ("get_lightmap_size_hint", 3690982128),
            ),
    );

    classes.push(
        ClassDef::new("ArrayMesh", Some("Mesh"))
            .instantiable()
            .method("add_surface_from_arrays", 1796411378, MeshService::add_surface_from_arrays)
            .method("clear_surfaces", 3218959716, MeshService::clear_surfaces)
            .method("surface_get_name", 990163283, MeshService::surface_get_name)
            .method("surface_set_name", 501894301, MeshService::surface_set_name)
            .method("surface_find_by_name", 1321353865, MeshService::surface_find_by_name)
            .method("add_blend_shape", 3304788590, MeshService::add_blend_shape)
            .method("get_blend_shape_count", 3905245786, MeshService::get_blend_shape_count)
            .method("clear_blend_shapes", 3218959716, MeshService::clear_blend_shapes)
            .property(
                "blend_shape_mode",
                || Variant::Int(1),
                ("set_blend_shape_mode", 227983991),
                ("get_blend_shape_mode", 836485024),
            )
            .property(
                "custom_aabb",
                || Variant::Aabb(Aabb::default()),
                ("set_custom_aabb", 259215842),
                ("get_custom_aabb", 1068685055),
            ),
    );

    classes.push(
        ClassDef::new("Texture2D", Some("Resource"))
            .method("get_width", 3905245786, |engine, id, _| {
                Variant::Int(TextureService::size(engine, id).x as i64)
            })
            .method("get_height", 3905245786, |engine, id, _| {
                Variant::Int(TextureService::size(engine, id).y as i64)
            })
            .method("get_size", 3341600327, |engine, id, _| {
                Variant::Vector2(TextureService::size(engine, id))
            })
            .method("has_alpha", 36873697, |_, _, _| Variant::Bool(false)),
    );

    classes.push(
        ClassDef::new("PlaceholderTexture2D", Some("Texture2D"))
            .instantiable()
            .method("set_size", 743155724, TextureService::set_size)
            .property_with("size", || Variant::Vector2(Vec2::ONE), Some("set_size"), Some("get_size")),
    );
}

/// 网格服务 - 表面与混合形状簿记
pub struct MeshService;

impl MeshService {
    fn surface<R>(engine: &HeadlessEngine, id: ObjectId, index: i64, f: impl FnOnce(&Surface) -> R) -> Option<R> {
        let result = engine
            .with_state(id, |state| {
                usize::try_from(index)
                    .ok()
                    .and_then(|index| state.surfaces.get(index))
                    .map(f)
            })
            .flatten();
        if result.is_none() {
            tracing::error!(target: "headless", surface = index, "Surface index out of range");
        }
        result
    }

    fn get_surface_count(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        Variant::Int(engine.with_state(id, |state| state.surfaces.len() as i64).unwrap_or(0))
    }

    fn surface_get_primitive_type(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        Self::surface(engine, id, arg(args, 0), |surface| Variant::Int(surface.primitive))
            .unwrap_or_default()
    }

    fn surface_get_arrays(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let arrays = Self::surface(engine, id, arg(args, 0), |surface| surface.arrays.clone());
        Variant::Array(arrays.unwrap_or_default())
    }

    fn surface_get_array_len(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        Self::surface(engine, id, arg(args, 0), |surface| {
            Variant::Int(vertex_count(&surface.arrays[ARRAY_VERTEX]) as i64)
        })
        .unwrap_or_default()
    }

    /// 所有表面顶点的包围盒；设置了自定义包围盒时直接返回
    fn get_aabb(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let custom: Aabb = engine.property(id, "custom_aabb").to();
        if custom != Aabb::default() {
            return Variant::Aabb(custom);
        }
        let points: Vec<Vec3> = engine
            .with_state(id, |state| {
                state
                    .surfaces
                    .iter()
                    .flat_map(|surface| vertices(&surface.arrays[ARRAY_VERTEX]))
                    .collect()
            })
            .unwrap_or_default();
        Variant::Aabb(Aabb::from_points(&points))
    }

    fn add_surface_from_arrays(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let primitive: i64 = arg(args, 0);
        let arrays: VariantArray = arg(args, 1);
        let blend_shapes: VariantArray = arg(args, 2);
        let flags: i64 = arg(args, 4);

        if arrays.len() != ARRAY_MAX {
            tracing::error!(target: "headless", len = arrays.len(), "Surface arrays must have ARRAY_MAX slots");
            return Variant::Nil;
        }
        if arrays[ARRAY_VERTEX].is_nil() {
            tracing::error!(target: "headless", "Surface arrays have no vertices");
            return Variant::Nil;
        }

        let mut format = arrays
            .iter()
            .enumerate()
            .filter(|(_, array)| !array.is_nil())
            .fold(0_i64, |format, (slot, _)| format | (1 << slot));
        if matches!(arrays[ARRAY_VERTEX], Variant::PackedVector2Array(_)) {
            format |= FLAG_USE_2D_VERTICES;
        }
        format |= flags;

        let added = engine.with_state(id, |state| {
            if blend_shapes.len() != state.blend_shapes.len() {
                return Err(state.blend_shapes.len());
            }
            state.surfaces.push(Surface {
                primitive,
                arrays,
                format,
                name: String::new(),
            });
            Ok(state.surfaces.len())
        });
        match added {
            Some(Ok(count)) => {
                tracing::trace!(target: "headless", id = id.raw(), surfaces = count, format, "Surface added");
                engine.emit_signal(id, "changed", &[]);
            }
            Some(Err(expected)) => tracing::error!(
                target: "headless",
                expected,
                found = blend_shapes.len(),
                "Blend shape array count mismatch"
            ),
            None => {}
        }
        Variant::Nil
    }

    fn clear_surfaces(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        engine.with_state(id, |state| state.surfaces.clear());
        engine.emit_signal(id, "changed", &[]);
        Variant::Nil
    }

    fn surface_get_name(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        Self::surface(engine, id, arg(args, 0), |surface| Variant::String(surface.name.clone()))
            .unwrap_or_else(|| Variant::String(String::new()))
    }

    fn surface_set_name(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let index: i64 = arg(args, 0);
        let name: String = arg(args, 1);
        let renamed = engine
            .with_state(id, |state| {
                let surface = usize::try_from(index).ok().and_then(|i| state.surfaces.get_mut(i))?;
                surface.name = name;
                Some(())
            })
            .flatten();
        if renamed.is_none() {
            tracing::error!(target: "headless", surface = index, "Surface index out of range");
        }
        Variant::Nil
    }

    fn surface_find_by_name(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let name: String = arg(args, 0);
        let index = engine
            .with_state(id, |state| state.surfaces.iter().position(|surface| surface.name == name))
            .flatten();
        Variant::Int(index.map_or(-1, |index| index as i64))
    }

    /// 只能在没有表面时添加
    fn add_blend_shape(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let name: StringName = arg(args, 0);
        let added = engine.with_state(id, |state| {
            if !state.surfaces.is_empty() {
                return false;
            }
            state.blend_shapes.push(name);
            true
        });
        if added == Some(false) {
            tracing::error!(target: "headless", "Can't add a blend shape once surfaces exist");
        }
        Variant::Nil
    }

    fn get_blend_shape_count(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        Variant::Int(engine.with_state(id, |state| state.blend_shapes.len() as i64).unwrap_or(0))
    }

    fn clear_blend_shapes(engine: &HeadlessEngine, id: ObjectId, _args: &[Variant]) -> Variant {
        let cleared = engine.with_state(id, |state| {
            if !state.surfaces.is_empty() {
                return false;
            }
            state.blend_shapes.clear();
            true
        });
        if cleared == Some(false) {
            tracing::error!(target: "headless", "Can't clear blend shapes once surfaces exist");
        }
        Variant::Nil
    }
}

fn vertex_count(array: &Variant) -> usize {
    match array {
        Variant::PackedVector3Array(points) => points.len(),
        Variant::PackedVector2Array(points) => points.len(),
        _ => 0,
    }
}

fn vertices(array: &Variant) -> Vec<Vec3> {
    match array {
        Variant::PackedVector3Array(points) => points.clone(),
        Variant::PackedVector2Array(points) => points.iter().map(|p| p.extend(0.0)).collect(),
        _ => Vec::new(),
    }
}

/// 纹理服务
pub struct TextureService;

impl TextureService {
    pub(super) fn size(engine: &HeadlessEngine, id: ObjectId) -> Vec2 {
        engine.property(id, "size").to()
    }

    fn set_size(engine: &HeadlessEngine, id: ObjectId, args: &[Variant]) -> Variant {
        let size: Vec2 = arg(args, 0);
        engine.store_property(id, "size", Variant::Vector2(size));
        engine.emit_signal(id, "changed", &[]);
        Variant::Nil
    }
}
