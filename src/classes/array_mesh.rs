//! `ArrayMesh`: mesh built from raw surface arrays.

use crate::bindings::call::{call_0, call_1, call_2, call_5};
use crate::bindings::class_info::construct;
use crate::bindings::method_bind::MethodBind;
use crate::bindings::string_name::StringName;
use crate::bindings::variant::{Aabb, Dictionary, VariantArray};
use crate::classes::mesh::{ArrayFormat, BlendShapeMode, PrimitiveType};
use crate::classes::Mesh;
use crate::core::error::BindingResult;

static ADD_SURFACE_FROM_ARRAYS: MethodBind =
    MethodBind::new("ArrayMesh", "add_surface_from_arrays", 1796411378);
static CLEAR_SURFACES: MethodBind = MethodBind::new("ArrayMesh", "clear_surfaces", 3218959716);
static SURFACE_GET_NAME: MethodBind = MethodBind::new("ArrayMesh", "surface_get_name", 990163283);
static SURFACE_SET_NAME: MethodBind = MethodBind::new("ArrayMesh", "surface_set_name", 501894301);
static SURFACE_FIND_BY_NAME: MethodBind =
    MethodBind::new("ArrayMesh", "surface_find_by_name", 1321353865);
static ADD_BLEND_SHAPE: MethodBind = MethodBind::new("ArrayMesh", "add_blend_shape", 3304788590);
static GET_BLEND_SHAPE_COUNT: MethodBind =
    MethodBind::new("ArrayMesh", "get_blend_shape_count", 3905245786);
static CLEAR_BLEND_SHAPES: MethodBind =
    MethodBind::new("ArrayMesh", "clear_blend_shapes", 3218959716);
static SET_BLEND_SHAPE_MODE: MethodBind =
    MethodBind::new("ArrayMesh", "set_blend_shape_mode", 227983991);
static GET_BLEND_SHAPE_MODE: MethodBind =
    MethodBind::new("ArrayMesh", "get_blend_shape_mode", 836485024);
static SET_CUSTOM_AABB: MethodBind = MethodBind::new("ArrayMesh", "set_custom_aabb", 259215842);
static GET_CUSTOM_AABB: MethodBind = MethodBind::new("ArrayMesh", "get_custom_aabb", 1068685055);

crate::engine_class! {
    pub struct ArrayMesh : Mesh {
        methods: [
            "add_surface_from_arrays",
            "clear_surfaces",
            "surface_get_name",
            "surface_set_name",
            "surface_find_by_name",
            "add_blend_shape",
            "get_blend_shape_count",
            "clear_blend_shapes",
            "set_blend_shape_mode",
            "get_blend_shape_mode",
            "set_custom_aabb",
            "get_custom_aabb",
        ],
        properties: ["blend_shape_mode", "custom_aabb"],
        signals: [],
    }
}

impl ArrayMesh {
    pub fn new() -> BindingResult<Self> {
        construct::<Self>()
    }

    /// Adds a surface with no blend shapes, no LODs and no format flags.
    pub fn add_surface_from_arrays(&self, primitive: PrimitiveType, arrays: VariantArray) {
        self.add_surface_from_arrays_ex(primitive, arrays).done()
    }

    pub fn add_surface_from_arrays_ex(
        &self,
        primitive: PrimitiveType,
        arrays: VariantArray,
    ) -> ExAddSurfaceFromArrays<'_> {
        ExAddSurfaceFromArrays {
            mesh: self,
            primitive,
            arrays,
            blend_shapes: VariantArray::new(),
            lods: Dictionary::new(),
            flags: ArrayFormat::empty(),
        }
    }

    pub fn clear_surfaces(&self) {
        call_0(&CLEAR_SURFACES, self.handle())
    }

    pub fn surface_get_name(&self, surface: i32) -> String {
        call_1(&SURFACE_GET_NAME, self.handle(), surface)
    }

    pub fn surface_set_name(&self, surface: i32, name: &str) {
        call_2(&SURFACE_SET_NAME, self.handle(), surface, name)
    }

    /// Index of the named surface, `-1` if absent.
    pub fn surface_find_by_name(&self, name: &str) -> i32 {
        call_1(&SURFACE_FIND_BY_NAME, self.handle(), name)
    }

    pub fn add_blend_shape(&self, name: impl Into<StringName>) {
        call_1(&ADD_BLEND_SHAPE, self.handle(), name.into())
    }

    pub fn get_blend_shape_count(&self) -> i32 {
        call_0(&GET_BLEND_SHAPE_COUNT, self.handle())
    }

    pub fn clear_blend_shapes(&self) {
        call_0(&CLEAR_BLEND_SHAPES, self.handle())
    }

    pub fn set_blend_shape_mode(&self, mode: BlendShapeMode) {
        call_1(&SET_BLEND_SHAPE_MODE, self.handle(), mode)
    }

    pub fn get_blend_shape_mode(&self) -> BlendShapeMode {
        call_0(&GET_BLEND_SHAPE_MODE, self.handle())
    }

    pub fn set_custom_aabb(&self, aabb: Aabb) {
        call_1(&SET_CUSTOM_AABB, self.handle(), aabb)
    }

    pub fn get_custom_aabb(&self) -> Aabb {
        call_0(&GET_CUSTOM_AABB, self.handle())
    }
}

/// `add_surface_from_arrays` with overridable defaults.
#[must_use]
pub struct ExAddSurfaceFromArrays<'a> {
    mesh: &'a ArrayMesh,
    primitive: PrimitiveType,
    arrays: VariantArray,
    blend_shapes: VariantArray,
    lods: Dictionary,
    flags: ArrayFormat,
}

impl ExAddSurfaceFromArrays<'_> {
    pub fn blend_shapes(mut self, blend_shapes: VariantArray) -> Self {
        self.blend_shapes = blend_shapes;
        self
    }

    pub fn lods(mut self, lods: Dictionary) -> Self {
        self.lods = lods;
        self
    }

    pub fn flags(mut self, flags: ArrayFormat) -> Self {
        self.flags = flags;
        self
    }

    pub fn done(self) {
        call_5(
            &ADD_SURFACE_FROM_ARRAYS,
            self.mesh.handle(),
            self.primitive,
            self.arrays,
            self.blend_shapes,
            self.lods,
            self.flags,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::class_info::EngineClass;
    use crate::bindings::variant::Variant;
    use crate::classes::mesh::ArrayType;
    use crate::headless::HeadlessEngine;
    use glam::Vec3;

    fn triangle_arrays() -> VariantArray {
        let mut arrays = vec![Variant::Nil; ArrayType::MAX.ord() as usize];
        arrays[ArrayType::VERTEX.ord() as usize] = Variant::PackedVector3Array(vec![
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ]);
        arrays
    }

    #[test]
    fn test_add_surface_records_primitive() {
        HeadlessEngine::install();
        let mesh = ArrayMesh::new().unwrap();
        mesh.add_surface_from_arrays(PrimitiveType::TRIANGLES, triangle_arrays());

        assert_eq!(mesh.get_surface_count(), 1);
        assert_eq!(mesh.surface_get_primitive_type(0), PrimitiveType::TRIANGLES);
        assert_eq!(mesh.surface_get_array_len(0), 3);
        assert_eq!(mesh.get_aabb().size, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_add_surface_default_arguments() {
        let engine = HeadlessEngine::install();
        let mesh = ArrayMesh::new().unwrap();
        mesh.add_surface_from_arrays(PrimitiveType::LINES, triangle_arrays());

        let args = engine
            .last_args(mesh.instance_id(), "add_surface_from_arrays")
            .unwrap();
        assert_eq!(args.len(), 5);
        assert_eq!(args[0], Variant::Int(1));
        assert_eq!(args[2], Variant::Array(Vec::new()));
        assert_eq!(args[3], Variant::Dictionary(Dictionary::new()));
        assert_eq!(args[4], Variant::Int(0));

        mesh.add_surface_from_arrays_ex(PrimitiveType::POINTS, triangle_arrays())
            .flags(ArrayFormat::FLAG_USE_DYNAMIC_UPDATE)
            .done();
        let args = engine
            .last_args(mesh.instance_id(), "add_surface_from_arrays")
            .unwrap();
        assert_eq!(args[4], Variant::Int(1 << 26));
        assert_eq!(mesh.get_surface_count(), 2);
    }

    #[test]
    fn test_surface_names() {
        HeadlessEngine::install();
        let mesh = ArrayMesh::new().unwrap();
        mesh.add_surface_from_arrays(PrimitiveType::TRIANGLES, triangle_arrays());
        mesh.surface_set_name(0, "hull");

        assert_eq!(mesh.surface_get_name(0), "hull");
        assert_eq!(mesh.surface_find_by_name("hull"), 0);
        assert_eq!(mesh.surface_find_by_name("missing"), -1);

        mesh.clear_surfaces();
        assert_eq!(mesh.get_surface_count(), 0);
    }

    #[test]
    fn test_blend_shapes() {
        HeadlessEngine::install();
        let mesh = ArrayMesh::new().unwrap();
        mesh.add_blend_shape("smile");
        mesh.add_blend_shape("frown");
        assert_eq!(mesh.get_blend_shape_count(), 2);
        mesh.clear_blend_shapes();
        assert_eq!(mesh.get_blend_shape_count(), 0);

        mesh.set_blend_shape_mode(BlendShapeMode::NORMALIZED);
        assert_eq!(mesh.get_blend_shape_mode(), BlendShapeMode::NORMALIZED);
    }
}
