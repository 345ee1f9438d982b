//! 统一错误处理模块
//!
//! 绑定层自身只有基础设施错误：动态库加载、符号缺失、后端安装、配置等。
//! 被包装的引擎方法不经过这里，它们的失败（哨兵值、空句柄、错误码）原样透传。

use crate::bindings::variant::VariantConversionError;
use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// 绑定层错误类型
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Failed to load engine library {path}: {reason}")]
    LibraryLoad { path: PathBuf, reason: String },

    #[error("Engine library is missing symbol `{0}`")]
    MissingSymbol(String),

    #[error("Engine backend already installed")]
    AlreadyInitialized,

    #[error("No constructor registered for class {0}")]
    ConstructorNotFound(String),

    #[error("Engine failed to construct an instance of {0}")]
    ConstructionFailed(String),

    #[error("Engine singleton not found: {0}")]
    SingletonNotFound(String),

    #[error("Argument frame encoding error: {0}")]
    Encode(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Variant conversion error: {0}")]
    Conversion(#[from] VariantConversionError),
}

/// 绑定层结果类型别名
pub type BindingResult<T> = Result<T, BindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::ValidationError("empty library path".to_string());
        let err: BindingError = config_err.into();
        assert!(matches!(err, BindingError::Config(_)));
    }

    #[test]
    fn test_error_display() {
        let err = BindingError::ConstructorNotFound("ArrayMesh".to_string());
        assert_eq!(err.to_string(), "No constructor registered for class ArrayMesh");

        let err = BindingError::MissingSymbol("engine_bindings_call".to_string());
        assert_eq!(
            err.to_string(),
            "Engine library is missing symbol `engine_bindings_call`"
        );
    }
}
