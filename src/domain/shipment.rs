// ==========================================
// 后台运营系统 - 物流领域模型
// ==========================================
// 对齐: shipment / shipment_status_event 表
// 红线: 状态事件只追加，不修改、不删除
// ==========================================

use crate::domain::types::{Actor, ShipmentStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Shipment - 运单（对账核心只读）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: i64,          // 内部ID
    pub tracking_code: String,     // 运单号（业务键，不保证唯一）
    pub sale_id: Option<i64>,      // 关联销售
    pub created_at: NaiveDateTime, // 创建时间
}

// ==========================================
// ShipmentStatusEvent - 物流状态事件
// ==========================================
// 按 tracking_code 追加；"最新" = 最后追加的一条
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentStatusEvent {
    pub event_id: Option<i64>,     // 自增序号（落库前为 None）
    pub tracking_code: String,     // 运单号
    pub status: ShipmentStatus,    // 状态
    pub description: String,       // 最后事件描述
    pub actor: Actor,              // 操作人
    pub location: String,          // 所在位置
    pub created_at: NaiveDateTime, // 创建时间
}

impl ShipmentStatusEvent {
    /// 构造一条由自动导入产生的事件
    pub fn automated(
        tracking_code: impl Into<String>,
        status: ShipmentStatus,
        description: impl Into<String>,
        location: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: None,
            tracking_code: tracking_code.into(),
            status,
            description: description.into(),
            actor: Actor::System,
            location: location.into(),
            created_at,
        }
    }
}
