//! `Mesh`: abstract geometry resource, plus the mesh array enums.

use crate::bindings::call::{call_0, call_1};
use crate::bindings::method_bind::MethodBind;
use crate::bindings::variant::{
    Aabb, FromVariant, ToVariant, Variant, VariantArray, VariantConversionError,
};
use crate::classes::Resource;
use bitflags::bitflags;
use glam::IVec2;

static GET_SURFACE_COUNT: MethodBind = MethodBind::new("Mesh", "get_surface_count", 3905245786);
static SURFACE_GET_PRIMITIVE_TYPE: MethodBind =
    MethodBind::new("Mesh", "surface_get_primitive_type", 4141943888);
static SURFACE_GET_ARRAYS: MethodBind = MethodBind::new("Mesh", "surface_get_arrays", 663333327);
static SURFACE_GET_ARRAY_LEN: MethodBind =
    MethodBind::new("Mesh", "surface_get_array_len", 923996154);
static GET_AABB: MethodBind = MethodBind::new("Mesh", "get_aabb", 1068685055);
static SET_LIGHTMAP_SIZE_HINT: MethodBind =
    MethodBind::new("Mesh", "set_lightmap_size_hint", 1130785943);
static GET_LIGHTMAP_SIZE_HINT: MethodBind =
    MethodBind::new("Mesh", "get_lightmap_size_hint", 3690982128);

crate::engine_enum! {
    /// 图元类型
    pub struct PrimitiveType {
        POINTS = 0,
        LINES = 1,
        LINE_STRIP = 2,
        TRIANGLES = 3,
        TRIANGLE_STRIP = 4,
    }
}

crate::engine_enum! {
    /// Slot of a surface array.
    pub struct ArrayType {
        VERTEX = 0,
        NORMAL = 1,
        TANGENT = 2,
        COLOR = 3,
        TEX_UV = 4,
        TEX_UV2 = 5,
        CUSTOM0 = 6,
        CUSTOM1 = 7,
        CUSTOM2 = 8,
        CUSTOM3 = 9,
        BONES = 10,
        WEIGHTS = 11,
        INDEX = 12,
        MAX = 13,
    }
}

crate::engine_enum! {
    pub struct BlendShapeMode {
        NORMALIZED = 0,
        RELATIVE = 1,
    }
}

bitflags! {
    /// Surface format flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ArrayFormat: u64 {
        const VERTEX = 1;
        const NORMAL = 1 << 1;
        const TANGENT = 1 << 2;
        const COLOR = 1 << 3;
        const TEX_UV = 1 << 4;
        const TEX_UV2 = 1 << 5;
        const CUSTOM0 = 1 << 6;
        const CUSTOM1 = 1 << 7;
        const CUSTOM2 = 1 << 8;
        const CUSTOM3 = 1 << 9;
        const BONES = 1 << 10;
        const WEIGHTS = 1 << 11;
        const INDEX = 1 << 12;
        const FLAG_USE_2D_VERTICES = 1 << 25;
        const FLAG_USE_DYNAMIC_UPDATE = 1 << 26;
        const FLAG_USE_8_BONE_WEIGHTS = 1 << 27;
        const FLAG_USES_EMPTY_VERTEX_ARRAY = 1 << 28;
        const FLAG_COMPRESS_ATTRIBUTES = 1 << 29;
    }
}

impl ToVariant for ArrayFormat {
    fn to_variant(&self) -> Variant {
        Variant::Int(self.bits() as i64)
    }
}

impl FromVariant for ArrayFormat {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        i64::try_from_variant(variant).map(|bits| ArrayFormat::from_bits_retain(bits as u64))
    }
}

crate::engine_class! {
    pub struct Mesh : Resource {
        methods: [
            "get_surface_count",
            "surface_get_primitive_type",
            "surface_get_arrays",
            "surface_get_array_len",
            "get_aabb",
            "set_lightmap_size_hint",
            "get_lightmap_size_hint",
        ],
        properties: ["lightmap_size_hint"],
        signals: [],
    }
}

impl Mesh {
    pub fn get_surface_count(&self) -> i32 {
        call_0(&GET_SURFACE_COUNT, self.handle())
    }

    pub fn surface_get_primitive_type(&self, surface: i32) -> PrimitiveType {
        call_1(&SURFACE_GET_PRIMITIVE_TYPE, self.handle(), surface)
    }

    /// Arrays of one surface, indexed by [`ArrayType`].
    pub fn surface_get_arrays(&self, surface: i32) -> VariantArray {
        call_1(&SURFACE_GET_ARRAYS, self.handle(), surface)
    }

    pub fn surface_get_array_len(&self, surface: i32) -> i32 {
        call_1(&SURFACE_GET_ARRAY_LEN, self.handle(), surface)
    }

    pub fn get_aabb(&self) -> Aabb {
        call_0(&GET_AABB, self.handle())
    }

    pub fn set_lightmap_size_hint(&self, size: IVec2) {
        call_1(&SET_LIGHTMAP_SIZE_HINT, self.handle(), size)
    }

    pub fn get_lightmap_size_hint(&self) -> IVec2 {
        call_0(&GET_LIGHTMAP_SIZE_HINT, self.handle())
    }
}
