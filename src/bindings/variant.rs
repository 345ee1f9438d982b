//! Variant: the value type crossing the native boundary.
//!
//! Arguments are packed into `Variant`s by the call adapters and return
//! values are decoded back through [`FromVariant`].

use super::backend::ObjectId;
use super::string_name::StringName;
use glam::{IVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 颜色（线性 RGBA）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// 与引擎一致：不透明黑色
impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// 2D 轴对齐矩形
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect2 {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect2 {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }
}

/// 3D 轴对齐包围盒
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub position: Vec3,
    pub size: Vec3,
}

impl Aabb {
    pub const fn new(position: Vec3, size: Vec3) -> Self {
        Self { position, size }
    }

    /// 包含所有点的最小包围盒
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self::new(min, max - min)
    }
}

/// Engine dictionary; keys are variants and insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dictionary {
    entries: Vec<(Variant, Variant)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl ToVariant, value: impl ToVariant) -> Option<Variant> {
        let key = key.to_variant();
        let value = value.to_variant();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: impl ToVariant) -> Option<&Variant> {
        let key = key.to_variant();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variant, &Variant)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// Untyped engine array.
pub type VariantArray = Vec<Variant>;

/// 变体类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantType {
    Nil,
    Bool,
    Int,
    Float,
    String,
    StringName,
    Vector2,
    Vector2i,
    Vector3,
    Rect2,
    Aabb,
    Color,
    Object,
    Dictionary,
    Array,
    PackedByteArray,
    PackedInt32Array,
    PackedFloat32Array,
    PackedStringArray,
    PackedVector2Array,
    PackedVector3Array,
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Dynamically typed engine value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringName(StringName),
    Vector2(Vec2),
    Vector2i(IVec2),
    Vector3(Vec3),
    Rect2(Rect2),
    Aabb(Aabb),
    Color(Color),
    Object(Option<ObjectId>),
    Dictionary(Dictionary),
    Array(VariantArray),
    PackedByteArray(Vec<u8>),
    PackedInt32Array(Vec<i32>),
    PackedFloat32Array(Vec<f32>),
    PackedStringArray(Vec<String>),
    PackedVector2Array(Vec<Vec2>),
    PackedVector3Array(Vec<Vec3>),
}

impl Variant {
    pub fn get_type(&self) -> VariantType {
        match self {
            Variant::Nil => VariantType::Nil,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int(_) => VariantType::Int,
            Variant::Float(_) => VariantType::Float,
            Variant::String(_) => VariantType::String,
            Variant::StringName(_) => VariantType::StringName,
            Variant::Vector2(_) => VariantType::Vector2,
            Variant::Vector2i(_) => VariantType::Vector2i,
            Variant::Vector3(_) => VariantType::Vector3,
            Variant::Rect2(_) => VariantType::Rect2,
            Variant::Aabb(_) => VariantType::Aabb,
            Variant::Color(_) => VariantType::Color,
            Variant::Object(_) => VariantType::Object,
            Variant::Dictionary(_) => VariantType::Dictionary,
            Variant::Array(_) => VariantType::Array,
            Variant::PackedByteArray(_) => VariantType::PackedByteArray,
            Variant::PackedInt32Array(_) => VariantType::PackedInt32Array,
            Variant::PackedFloat32Array(_) => VariantType::PackedFloat32Array,
            Variant::PackedStringArray(_) => VariantType::PackedStringArray,
            Variant::PackedVector2Array(_) => VariantType::PackedVector2Array,
            Variant::PackedVector3Array(_) => VariantType::PackedVector3Array,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    /// 按目标类型解码
    pub fn try_to<T: FromVariant>(&self) -> Result<T, VariantConversionError> {
        T::try_from_variant(self)
    }

    /// 解码失败时返回目标类型的默认值
    pub fn to<T: FromVariant + Default>(&self) -> T {
        T::try_from_variant(self).unwrap_or_default()
    }
}

/// 变体转换错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VariantConversionError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: VariantType,
        found: VariantType,
    },
    #[error("{value} does not fit in {target}")]
    OutOfRange { target: &'static str, value: i64 },
}

impl VariantConversionError {
    pub fn new(expected: VariantType, found: &Variant) -> Self {
        Self::Mismatch {
            expected,
            found: found.get_type(),
        }
    }
}

/// Packs a value into a [`Variant`].
pub trait ToVariant {
    fn to_variant(&self) -> Variant;
}

/// Unpacks a value from a [`Variant`].
pub trait FromVariant: Sized {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError>;
}

impl<T: ToVariant + ?Sized> ToVariant for &T {
    fn to_variant(&self) -> Variant {
        (**self).to_variant()
    }
}

impl ToVariant for Variant {
    fn to_variant(&self) -> Variant {
        self.clone()
    }
}

impl FromVariant for Variant {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        Ok(variant.clone())
    }
}

/// Void returns accept whatever the engine hands back.
impl FromVariant for () {
    fn try_from_variant(_variant: &Variant) -> Result<Self, VariantConversionError> {
        Ok(())
    }
}

macro_rules! impl_variant_conversion {
    ($ty:ty, $arm:ident) => {
        impl ToVariant for $ty {
            fn to_variant(&self) -> Variant {
                Variant::$arm(self.clone())
            }
        }

        impl FromVariant for $ty {
            fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
                match variant {
                    Variant::$arm(value) => Ok(value.clone()),
                    other => Err(VariantConversionError::new(VariantType::$arm, other)),
                }
            }
        }
    };
}

impl_variant_conversion!(bool, Bool);
impl_variant_conversion!(i64, Int);
impl_variant_conversion!(StringName, StringName);
impl_variant_conversion!(Vec2, Vector2);
impl_variant_conversion!(IVec2, Vector2i);
impl_variant_conversion!(Vec3, Vector3);
impl_variant_conversion!(Rect2, Rect2);
impl_variant_conversion!(Aabb, Aabb);
impl_variant_conversion!(Color, Color);
impl_variant_conversion!(Dictionary, Dictionary);
impl_variant_conversion!(VariantArray, Array);
impl_variant_conversion!(Vec<u8>, PackedByteArray);
impl_variant_conversion!(Vec<i32>, PackedInt32Array);
impl_variant_conversion!(Vec<f32>, PackedFloat32Array);
impl_variant_conversion!(Vec<String>, PackedStringArray);
impl_variant_conversion!(Vec<Vec2>, PackedVector2Array);
impl_variant_conversion!(Vec<Vec3>, PackedVector3Array);

impl ToVariant for i32 {
    fn to_variant(&self) -> Variant {
        Variant::Int(i64::from(*self))
    }
}

impl FromVariant for i32 {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        let value = i64::try_from_variant(variant)?;
        i32::try_from(value).map_err(|_| VariantConversionError::OutOfRange { target: "i32", value })
    }
}

impl ToVariant for f64 {
    fn to_variant(&self) -> Variant {
        Variant::Float(*self)
    }
}

impl FromVariant for f64 {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        match variant {
            Variant::Float(value) => Ok(*value),
            Variant::Int(value) => Ok(*value as f64),
            other => Err(VariantConversionError::new(VariantType::Float, other)),
        }
    }
}

impl ToVariant for f32 {
    fn to_variant(&self) -> Variant {
        Variant::Float(f64::from(*self))
    }
}

impl FromVariant for f32 {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        f64::try_from_variant(variant).map(|value| value as f32)
    }
}

impl ToVariant for str {
    fn to_variant(&self) -> Variant {
        Variant::String(self.to_owned())
    }
}

impl ToVariant for String {
    fn to_variant(&self) -> Variant {
        Variant::String(self.clone())
    }
}

impl FromVariant for String {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        match variant {
            Variant::String(value) => Ok(value.clone()),
            Variant::StringName(name) => Ok(name.as_str().to_owned()),
            other => Err(VariantConversionError::new(VariantType::String, other)),
        }
    }
}

impl ToVariant for ObjectId {
    fn to_variant(&self) -> Variant {
        Variant::Object(Some(*self))
    }
}

impl ToVariant for Option<ObjectId> {
    fn to_variant(&self) -> Variant {
        Variant::Object(*self)
    }
}

impl FromVariant for Option<ObjectId> {
    fn try_from_variant(variant: &Variant) -> Result<Self, VariantConversionError> {
        match variant {
            Variant::Object(id) => Ok(*id),
            Variant::Nil => Ok(None),
            other => Err(VariantConversionError::new(VariantType::Object, other)),
        }
    }
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        value.to_variant()
    }
}

impl From<i64> for Variant {
    fn from(value: i64) -> Self {
        Variant::Int(value)
    }
}

impl From<f64> for Variant {
    fn from(value: f64) -> Self {
        Variant::Float(value)
    }
}

impl From<bool> for Variant {
    fn from(value: bool) -> Self {
        Variant::Bool(value)
    }
}
