// ==========================================
// 后台运营系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::reconcile_config_trait::{
    ReconcileConfigReader, DEFAULT_RUN_HISTORY_LIMIT, DEFAULT_SNAPSHOT_PAGE_SIZE,
};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取正整数配置，缺失时返回默认值
    ///
    /// 格式错误或为 0 时报错，不静默回退
    fn get_positive_usize(&self, key: &str, default: usize) -> ConfigResult<usize> {
        let raw = match self.get_global_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            Ok(_) => Err(ConfigError::ValueError {
                key: key.to_string(),
                value: raw,
                message: "必须大于 0".to_string(),
            }),
            Err(e) => Err(ConfigError::ValueError {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
        }
    }
}

// ==========================================
// ReconcileConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ReconcileConfigReader for ConfigManager {
    async fn get_snapshot_page_size(&self) -> ConfigResult<usize> {
        self.get_positive_usize(config_keys::SNAPSHOT_PAGE_SIZE, DEFAULT_SNAPSHOT_PAGE_SIZE)
    }

    async fn get_run_history_limit(&self) -> ConfigResult<usize> {
        self.get_positive_usize(config_keys::RUN_HISTORY_LIMIT, DEFAULT_RUN_HISTORY_LIMIT)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 对账
    pub const SNAPSHOT_PAGE_SIZE: &str = "reconcile/snapshot_page_size";
    pub const RUN_HISTORY_LIMIT: &str = "reconcile/run_history_limit";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_defaults_when_missing() {
        let manager = setup_manager();
        assert_eq!(manager.get_snapshot_page_size().await.unwrap(), 100_000);
        assert_eq!(manager.get_run_history_limit().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_override_and_snapshot() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::SNAPSHOT_PAGE_SIZE, "500")
            .unwrap();
        manager
            .set_global_config_value(config_keys::SNAPSHOT_PAGE_SIZE, "250")
            .unwrap();

        assert_eq!(manager.get_snapshot_page_size().await.unwrap(), 250);
        assert_eq!(
            manager.get_config_snapshot().unwrap().get(config_keys::SNAPSHOT_PAGE_SIZE),
            Some(&"250".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_value_is_error() {
        let manager = setup_manager();
        manager
            .set_global_config_value(config_keys::RUN_HISTORY_LIMIT, "muchos")
            .unwrap();
        assert!(matches!(
            manager.get_run_history_limit().await,
            Err(ConfigError::ValueError { .. })
        ));

        manager
            .set_global_config_value(config_keys::RUN_HISTORY_LIMIT, "0")
            .unwrap();
        assert!(manager.get_run_history_limit().await.is_err());
    }
}
