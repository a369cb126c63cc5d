// ==========================================
// 后台运营系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含对账规则
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

mod codec;
pub mod error;
pub mod reconcile_run_repo;
pub mod sale_repo;
pub mod shipment_repo;
pub mod status_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use reconcile_run_repo::ReconcileRunRepository;
pub use sale_repo::SaleRepositoryImpl;
pub use shipment_repo::ShipmentRepositoryImpl;
pub use status_repo::{SaleStatusRepository, ShipmentStatusRepository};
