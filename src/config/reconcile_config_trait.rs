// ==========================================
// 后台运营系统 - 对账配置读取 Trait
// ==========================================
// 职责: 定义对账核心所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::error::ConfigResult;
use async_trait::async_trait;

/// 快照读取上限默认值（整表一次性读入内存）
pub const DEFAULT_SNAPSHOT_PAGE_SIZE: usize = 100_000;

/// 批次历史默认返回条数
pub const DEFAULT_RUN_HISTORY_LIMIT: usize = 50;

// ==========================================
// ReconcileConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ReconcileConfigReader: Send + Sync {
    /// 获取快照读取上限（运单/销售单各自一次性读取的最大行数）
    ///
    /// # 默认值
    /// - 100000
    async fn get_snapshot_page_size(&self) -> ConfigResult<usize>;

    /// 获取批次历史查询默认条数
    ///
    /// # 默认值
    /// - 50
    async fn get_run_history_limit(&self) -> ConfigResult<usize>;
}
