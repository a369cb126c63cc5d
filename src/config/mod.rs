// ==========================================
// 后台运营系统 - 配置层
// ==========================================
// 职责: 系统配置管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod error;
pub mod reconcile_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use reconcile_config_trait::{
    ReconcileConfigReader, DEFAULT_RUN_HISTORY_LIMIT, DEFAULT_SNAPSHOT_PAGE_SIZE,
};
