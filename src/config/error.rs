// ==========================================
// 后台运营系统 - 配置层错误类型
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
