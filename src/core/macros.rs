//! 核心宏定义
//!
//! 提供统一的宏来减少代码重复。`engine_enum!` 和 `engine_class!` 是包装类的
//! 生成模板：每个包装类的结构、名称表和变体转换都由它们展开。

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```ignore
/// struct MyStruct {
///     field1: u32,
///     field2: String,
/// }
///
/// impl_default!(MyStruct {
///     field1: 0,
///     field2: String::new(),
/// });
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

/// 声明引擎枚举
///
/// 引擎枚举以整数跨边界传递，未知的序数也必须原样保留，
/// 所以展开为带关联常量的新类型而不是 Rust `enum`。
///
/// ```ignore
/// engine_enum! {
///     pub struct PrimitiveType {
///         POINTS = 0,
///         TRIANGLES = 3,
///     }
/// }
/// assert_eq!(PrimitiveType::TRIANGLES.ord(), 3);
/// ```
#[macro_export]
macro_rules! engine_enum {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $($variant:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name {
            ord: i64,
        }

        #[allow(dead_code)]
        impl $name {
            $(pub const $variant: $name = $name { ord: $value };)*

            pub const fn from_ord(ord: i64) -> Self {
                Self { ord }
            }

            pub const fn ord(self) -> i64 {
                self.ord
            }

            /// 已知序数的常量名
            pub fn as_str(self) -> Option<&'static str> {
                match self.ord {
                    $(x if x == $value => Some(stringify!($variant)),)*
                    _ => None,
                }
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self.as_str() {
                    Some(name) => write!(f, "{}::{}", stringify!($name), name),
                    None => write!(f, "{}({})", stringify!($name), self.ord),
                }
            }
        }

        impl $crate::bindings::variant::ToVariant for $name {
            fn to_variant(&self) -> $crate::bindings::variant::Variant {
                $crate::bindings::variant::Variant::Int(self.ord)
            }
        }

        impl $crate::bindings::variant::FromVariant for $name {
            fn try_from_variant(
                variant: &$crate::bindings::variant::Variant,
            ) -> Result<Self, $crate::bindings::variant::VariantConversionError> {
                <i64 as $crate::bindings::variant::FromVariant>::try_from_variant(variant)
                    .map(Self::from_ord)
            }
        }
    };
}

/// 声明包装类
///
/// 展开内容：
/// - 包装结构体（组合父类，`Deref` 到父类）
/// - `EngineClass` 实现：类名、内存模式（默认继承父类，可用 `memory:` 覆盖）、
///   `ClassInfo` 名称表
/// - 变体转换（对象句柄）
///
/// 方法转发器、属性访问器和信号代理写在各自的类文件中。
#[macro_export]
macro_rules! engine_class {
    (@memory $base:ty) => {
        <$base as $crate::bindings::class_info::EngineClass>::MEMORY
    };
    (@memory $base:ty, $memory:ident) => {
        $crate::bindings::backend::Memory::$memory
    };
    (
        $(#[$meta:meta])*
        pub struct $name:ident : $base:ty {
            $(memory: $memory:ident,)?
            methods: [$($method:literal),* $(,)?],
            properties: [$($property:literal),* $(,)?],
            signals: [$($signal:literal),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name {
            base: $base,
        }

        impl $crate::bindings::class_info::EngineClass for $name {
            const CLASS_NAME: &'static str = stringify!($name);
            const MEMORY: $crate::bindings::backend::Memory =
                $crate::engine_class!(@memory $base $(, $memory)?);

            fn class_info() -> &'static $crate::bindings::class_info::ClassInfo {
                static INFO: $crate::bindings::class_info::ClassInfo =
                    $crate::bindings::class_info::ClassInfo::new(
                        stringify!($name),
                        Some(
                            <$base as $crate::bindings::class_info::EngineClass>::class_info
                                as fn() -> &'static $crate::bindings::class_info::ClassInfo,
                        ),
                        <$name as $crate::bindings::class_info::EngineClass>::MEMORY,
                        &[$($method),*],
                        &[$($property),*],
                        &[$($signal),*],
                    );
                &INFO
            }

            fn from_object_unchecked(object: $crate::classes::Object) -> Self {
                Self {
                    base: <$base as $crate::bindings::class_info::EngineClass>::from_object_unchecked(object),
                }
            }

            fn as_object(&self) -> &$crate::classes::Object {
                <$base as $crate::bindings::class_info::EngineClass>::as_object(&self.base)
            }

            fn into_object(self) -> $crate::classes::Object {
                <$base as $crate::bindings::class_info::EngineClass>::into_object(self.base)
            }
        }

        impl ::std::ops::Deref for $name {
            type Target = $base;

            fn deref(&self) -> &$base {
                &self.base
            }
        }

        impl $crate::bindings::variant::ToVariant for $name {
            fn to_variant(&self) -> $crate::bindings::variant::Variant {
                $crate::bindings::variant::ToVariant::to_variant(
                    $crate::bindings::class_info::EngineClass::as_object(self),
                )
            }
        }

        impl $crate::bindings::variant::ToVariant for Option<$name> {
            fn to_variant(&self) -> $crate::bindings::variant::Variant {
                match self {
                    Some(object) => $crate::bindings::variant::ToVariant::to_variant(object),
                    None => $crate::bindings::variant::Variant::Object(None),
                }
            }
        }

        impl $crate::bindings::variant::ToVariant for Option<&$name> {
            fn to_variant(&self) -> $crate::bindings::variant::Variant {
                match self {
                    Some(object) => $crate::bindings::variant::ToVariant::to_variant(*object),
                    None => $crate::bindings::variant::Variant::Object(None),
                }
            }
        }

        impl $crate::bindings::variant::FromVariant for Option<$name> {
            fn try_from_variant(
                variant: &$crate::bindings::variant::Variant,
            ) -> Result<Self, $crate::bindings::variant::VariantConversionError> {
                <Option<$crate::classes::Object> as $crate::bindings::variant::FromVariant>::try_from_variant(variant)
                    .map(|object| object.map(<$name as $crate::bindings::class_info::EngineClass>::from_object_unchecked))
            }
        }

        impl $crate::bindings::variant::FromVariant for $name {
            fn try_from_variant(
                variant: &$crate::bindings::variant::Variant,
            ) -> Result<Self, $crate::bindings::variant::VariantConversionError> {
                <Option<$name> as $crate::bindings::variant::FromVariant>::try_from_variant(variant)?
                    .ok_or_else(|| $crate::bindings::variant::VariantConversionError::new(
                        $crate::bindings::variant::VariantType::Object,
                        variant,
                    ))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::bindings::variant::{FromVariant, ToVariant, Variant};

    engine_enum! {
        pub struct Direction {
            LEFT = 0,
            RIGHT = 1,
        }
    }

    struct TestStruct {
        field1: u32,
        field2: String,
    }

    impl_default!(TestStruct {
        field1: 7,
        field2: String::new(),
    });

    #[test]
    fn test_impl_default() {
        let s = TestStruct::default();
        assert_eq!(s.field1, 7);
        assert_eq!(s.field2, "");
    }

    #[test]
    fn test_engine_enum_keeps_unknown_ordinals() {
        assert_eq!(Direction::RIGHT.ord(), 1);
        assert_eq!(Direction::default(), Direction::LEFT);
        assert_eq!(format!("{:?}", Direction::RIGHT), "Direction::RIGHT");

        let unknown = Direction::from_variant_or_default(&Variant::Int(9));
        assert_eq!(unknown.ord(), 9);
        assert_eq!(unknown.as_str(), None);
        assert_eq!(format!("{:?}", unknown), "Direction(9)");
        assert_eq!(unknown.to_variant(), Variant::Int(9));
    }

    impl Direction {
        fn from_variant_or_default(variant: &Variant) -> Self {
            Direction::try_from_variant(variant).unwrap_or_default()
        }
    }
}
