// ==========================================
// 后台运营系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、状态类型
// 红线: 不含数据访问逻辑,不含对账规则
// ==========================================

pub mod reconcile_run;
pub mod sale;
pub mod shipment;
pub mod types;

// 重导出核心类型
pub use reconcile_run::{ReconcileKind, ReconcileRun, RunOutcome};
pub use sale::{Sale, SaleStatusEvent};
pub use shipment::{Shipment, ShipmentStatusEvent};
pub use types::{Actor, SaleStatus, ShipmentStatus, StatusGate, UnknownStatus, AUTOMATED_ACTOR_ID};
