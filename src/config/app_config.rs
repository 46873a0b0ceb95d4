//! 应用配置管理
//!
//! 提供配置的加载、保存、更新功能，使用全局单例模式管理配置状态。

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    // 配置文件位于可执行文件同级目录
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 网关 API 根地址
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// 连接超时（秒）
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// 健康检查轮询间隔（秒）
    #[serde(default = "default_health_interval_secs")]
    pub health_interval_secs: u64,

    /// 无法从文件扩展名推断时使用的重构语言
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_health_interval_secs() -> u64 {
    30
}

fn default_language() -> String {
    "javascript".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            health_interval_secs: default_health_interval_secs(),
            default_language: default_language(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 轮询间隔，最小 1 秒
    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health_interval_secs.max(1))
    }
}

/// 全局配置单例
static CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(load_config_from_file().unwrap_or_default())
});

/// 从文件加载配置
fn load_config_from_file() -> Option<AppConfig> {
    let path = get_config_path();
    if path.exists() {
        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    } else {
        None
    }
}

/// 保存配置到文件
fn save_config_to_file(config: &AppConfig) -> Result<(), AppError> {
    let path = get_config_path();
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
    fs::write(&path, content)
        .map_err(|e| AppError::Config(format!("写入配置文件失败: {}", e)))?;
    Ok(())
}

/// 获取当前配置（克隆）
pub fn get_config() -> AppConfig {
    CONFIG.read().clone()
}

/// 更新配置
///
/// 接收一个闭包来修改配置，修改后自动保存到文件
pub fn update_config<F>(updater: F) -> Result<AppConfig, AppError>
where
    F: FnOnce(&mut AppConfig),
{
    let mut config = CONFIG.write();
    updater(&mut config);
    save_config_to_file(&config)?;
    Ok(config.clone())
}

/// 整体替换配置并保存到文件
pub fn set_config(config: AppConfig) -> Result<(), AppError> {
    let mut current = CONFIG.write();
    save_config_to_file(&config)?;
    *current = config;
    Ok(())
}

/// 重新从文件加载配置
pub fn reload_config() {
    if let Some(config) = load_config_from_file() {
        *CONFIG.write() = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.health_interval(), Duration::from_secs(30));
        assert_eq!(config.default_language, "javascript");
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"base_url": "https://qa.example.com/api"}"#).unwrap();
        assert_eq!(config.base_url, "https://qa.example.com/api");
        assert_eq!(config.connect_timeout_secs, 30);
        assert_eq!(config.default_language, "javascript");
    }

    #[test]
    fn test_health_interval_never_zero() {
        let config = AppConfig {
            health_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.health_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_set_config_replaces_and_persists() {
        let original = get_config();
        let updated = AppConfig {
            base_url: "http://127.0.0.1:9/api".to_string(),
            health_interval_secs: 5,
            ..original.clone()
        };

        set_config(updated).unwrap();
        assert_eq!(get_config().base_url, "http://127.0.0.1:9/api");
        assert_eq!(load_config_from_file().unwrap().health_interval_secs, 5);

        set_config(original.clone()).unwrap();
        assert_eq!(get_config().base_url, original.base_url);
    }
}
