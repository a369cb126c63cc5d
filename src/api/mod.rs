// ==========================================
// 后台运营系统 - API 层
// ==========================================
// 职责: 提供对账业务 API 接口,供 CLI / 上层服务调用
// ==========================================

pub mod error;
pub mod reconcile_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use reconcile_api::{ReconcileApi, ReconcileApiResponse, SqliteStatusImporter};
