//! Process-wide backend slot.
//!
//! The backend is installed once, either explicitly through [`initialize`] /
//! [`install_backend`] or lazily on first use from
//! [`BindingConfig::load_or_default`]. Method handle caches are tied to the
//! installed backend, so it can never be replaced afterwards.

use super::backend::EngineBackend;
use super::native::NativeBackend;
use crate::config::{BackendConfig, BindingConfig};
use crate::core::error::{BindingError, BindingResult};
use crate::core::logging::init_logging;
use crate::headless::HeadlessEngine;
use std::sync::{Arc, OnceLock};

static BACKEND: OnceLock<Arc<dyn EngineBackend>> = OnceLock::new();

/// 按配置初始化日志和引擎后端
pub fn initialize(config: &BindingConfig) -> BindingResult<()> {
    config.validate()?;
    init_logging(&config.logging);
    let backend = create_backend(&config.backend)?;
    install_backend(backend)
}

/// 安装后端；只能成功一次
pub fn install_backend(backend: Arc<dyn EngineBackend>) -> BindingResult<()> {
    let name = backend.name().to_string();
    BACKEND
        .set(backend)
        .map_err(|_| BindingError::AlreadyInitialized)?;
    tracing::info!(target: "bindings", backend = %name, "Engine backend installed");
    Ok(())
}

pub fn create_backend(config: &BackendConfig) -> BindingResult<Arc<dyn EngineBackend>> {
    match config {
        BackendConfig::Headless => Ok(HeadlessEngine::shared()),
        BackendConfig::Native { library_path } => Ok(Arc::new(NativeBackend::load(library_path)?)),
    }
}

/// 当前后端；未显式安装时按默认配置创建
pub fn backend() -> &'static dyn EngineBackend {
    BACKEND.get_or_init(default_backend).as_ref()
}

pub fn is_initialized() -> bool {
    BACKEND.get().is_some()
}

fn default_backend() -> Arc<dyn EngineBackend> {
    let config = BindingConfig::load_or_default();
    match create_backend(&config.backend) {
        Ok(backend) => {
            tracing::debug!(target: "bindings", backend = backend.name(), "Engine backend installed lazily");
            backend
        }
        Err(err) => {
            tracing::error!(target: "bindings", error = %err, "Falling back to headless engine");
            HeadlessEngine::shared()
        }
    }
}
