// ==========================================
// 后台运营系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、仓储和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ReconcileApi, SqliteStatusImporter};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::importer::StatusImporter;
use crate::repository::{ReconcileRunRepository, SaleRepositoryImpl, ShipmentRepositoryImpl};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "VENTAS_BACKOFFICE_DB";

/// 应用状态
///
/// 所有仓储共用同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 对账API
    pub reconcile_api: Arc<ReconcileApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 运单仓储（录入 / 查询历史）
    pub shipment_repo: Arc<ShipmentRepositoryImpl>,

    /// 销售单仓储（录入 / 查询历史）
    pub sale_repo: Arc<SaleRepositoryImpl>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    ///
    /// # 返回
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let shipment_repo = Arc::new(ShipmentRepositoryImpl::new(conn.clone()));
        let sale_repo = Arc::new(SaleRepositoryImpl::new(conn.clone()));
        let run_repo = Arc::new(ReconcileRunRepository::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // 初始化Importer / API层
        // ==========================================
        let importer: Arc<SqliteStatusImporter> = Arc::new(StatusImporter::new(
            ShipmentRepositoryImpl::new(conn.clone()),
            SaleRepositoryImpl::new(conn.clone()),
            ConfigManager::from_connection(conn),
        ));
        let reconcile_api = Arc::new(ReconcileApi::new(
            importer,
            run_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            reconcile_api,
            config_manager,
            shipment_repo,
            sale_repo,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 优先级
/// 1. 环境变量 VENTAS_BACKOFFICE_DB
/// 2. 本地数据目录/ventas-backoffice/ventas_backoffice.db
/// 3. ./ventas_backoffice.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./ventas_backoffice.db");

    if let Some(data_dir) = dirs::data_local_dir() {
        let dir = data_dir.join("ventas-backoffice");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("ventas_backoffice.db");
        }
    }

    path.to_string_lossy().to_string()
}
