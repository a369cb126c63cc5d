// ==========================================
// 后台运营系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 物流 / 销售导出文件与库内状态事件的对账
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 状态流转规则
pub mod engine;

// 导入层 - 文件解析与批次编排
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Actor, ReconcileKind, ReconcileRun, RunOutcome, Sale, SaleStatus, SaleStatusEvent, Shipment,
    ShipmentStatus, ShipmentStatusEvent, AUTOMATED_ACTOR_ID,
};

// 引擎
pub use engine::{TransitionDecision, TransitionPolicy};

// 导入
pub use importer::{ReconcileSummary, StatusImporter};

// API
pub use api::{ReconcileApi, ReconcileApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "后台运营系统";
