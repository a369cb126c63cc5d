// ==========================================
// 后台运营系统 - 应用层
// ==========================================
// 职责: 组装连接、仓储、导入器与API
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
