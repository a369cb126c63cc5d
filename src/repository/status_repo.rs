// ==========================================
// 后台运营系统 - 状态对账 Repository Trait
// ==========================================
// 职责: 定义对账核心所需的数据访问接口（不包含业务逻辑）
// 红线: Repository 不含对账规则，只做读取与追加
// ==========================================

use crate::domain::{Sale, SaleStatusEvent, Shipment, ShipmentStatusEvent};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ShipmentStatusRepository Trait
// ==========================================
// 实现者: ShipmentRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ShipmentStatusRepository: Send + Sync {
    /// 一次性读取运单快照（按 shipment_id 升序，最多 page_size 条）
    async fn fetch_all_shipments(&self, page_size: usize) -> RepositoryResult<Vec<Shipment>>;

    /// 查询运单号的最新状态事件
    ///
    /// # 返回
    /// - Ok(None): 该运单号没有任何历史事件
    async fn get_latest_event(
        &self,
        tracking_code: &str,
    ) -> RepositoryResult<Option<ShipmentStatusEvent>>;

    /// 追加状态事件，返回新事件的 event_id
    async fn append_event(&self, event: &ShipmentStatusEvent) -> RepositoryResult<i64>;
}

// ==========================================
// SaleStatusRepository Trait
// ==========================================
// 实现者: SaleRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait SaleStatusRepository: Send + Sync {
    /// 一次性读取销售单快照（按 sale_id 升序，最多 page_size 条）
    async fn fetch_all_sales(&self, page_size: usize) -> RepositoryResult<Vec<Sale>>;

    /// 查询销售单的最新状态事件
    async fn get_latest_event(&self, sale_id: i64) -> RepositoryResult<Option<SaleStatusEvent>>;

    /// 追加状态事件，返回新事件的 event_id
    async fn append_event(&self, event: &SaleStatusEvent) -> RepositoryResult<i64>;
}
