/// 绑定层配置
///
/// 提供TOML/JSON配置文件、环境变量覆盖，用于选择引擎后端和日志级别
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 绑定层主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingConfig {
    /// 引擎后端
    #[serde(default)]
    pub backend: BackendConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 引擎后端选择
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// 进程内的无头引擎（测试替身）
    #[default]
    Headless,
    /// 动态加载的原生引擎库
    Native { library_path: PathBuf },
}

impl BindingConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("ENGINE_BINDINGS_BACKEND") {
            if val.eq_ignore_ascii_case("headless") {
                self.backend = BackendConfig::Headless;
            }
        }
        if let Ok(val) = env::var("ENGINE_BINDINGS_LIBRARY") {
            if !val.is_empty() {
                self.backend = BackendConfig::Native {
                    library_path: PathBuf::from(val),
                };
            }
        }
        if let Ok(val) = env::var("ENGINE_BINDINGS_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if let BackendConfig::Native { library_path } = &self.backend {
            if library_path.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "native backend requires a library_path".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./engine_bindings.toml
    /// 2. ./engine_bindings.json
    /// 3. 使用默认配置
    ///
    /// 最后总是应用环境变量覆盖。
    pub fn load_or_default() -> Self {
        let mut config = if let Ok(config) = Self::from_toml_file("engine_bindings.toml") {
            tracing::debug!(target: "bindings", "Loaded config from engine_bindings.toml");
            config
        } else if let Ok(config) = Self::from_json_file("engine_bindings.json") {
            tracing::debug!(target: "bindings", "Loaded config from engine_bindings.json");
            config
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出到控制台
    pub log_to_console: bool,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Warn,
    log_to_console: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    /// 解析日志级别（大小写不敏感）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BindingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend, BackendConfig::Headless);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_native_backend_from_toml() {
        let config = BindingConfig::from_toml_str(
            r#"
            [backend]
            kind = "native"
            library_path = "/opt/engine/libengine.so"

            [logging]
            level = "debug"
            log_to_console = false
            "#,
        )
        .unwrap();

        assert_eq!(
            config.backend,
            BackendConfig::Native {
                library_path: PathBuf::from("/opt/engine/libengine.so")
            }
        );
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(!config.logging.log_to_console);
    }

    #[test]
    fn test_empty_library_path_rejected() {
        let config = BindingConfig {
            backend: BackendConfig::Native {
                library_path: PathBuf::new(),
            },
            ..BindingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_json_serialization() {
        let config = BindingConfig::default();
        let json_str = serde_json::to_string(&config).unwrap();
        let parsed = BindingConfig::from_json_str(&json_str).unwrap();
        assert_eq!(parsed.backend, config.backend);
    }

    #[test]
    fn test_save_and_reload_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine_bindings.toml");

        let mut config = BindingConfig::default();
        config.logging.level = LogLevel::Trace;
        config.save_toml(&path).unwrap();

        let reloaded = BindingConfig::from_toml_file(&path).unwrap();
        assert_eq!(reloaded.logging.level, LogLevel::Trace);
        assert_eq!(reloaded.backend, BackendConfig::Headless);
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let err = BindingConfig::from_toml_file("/nonexistent/engine_bindings.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse(" info "), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("verbose"), None);
    }
}
