// ==========================================
// 后台运营系统 - 销售领域模型
// ==========================================
// 对齐: sale / sale_status_event 表
// 说明: sale_code（SDS）用于匹配导入行，sale_id 用于挂接状态事件
// ==========================================

use crate::domain::types::{Actor, SaleStatus};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Sale - 销售单（对账核心只读）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub sale_id: i64,              // 内部数字ID
    pub sale_code: String,         // 销售系统编码 (SDS)
    pub created_at: NaiveDateTime, // 创建时间
}

// ==========================================
// SaleStatusEvent - 销售状态事件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleStatusEvent {
    pub event_id: Option<i64>,     // 自增序号（落库前为 None）
    pub sale_id: i64,              // 销售ID
    pub status: SaleStatus,        // 状态
    pub description: String,       // 备注（可为空）
    pub actor: Actor,              // 操作人
    pub created_at: NaiveDateTime, // 创建时间
}

impl SaleStatusEvent {
    /// 构造一条由自动导入产生的事件
    pub fn automated(
        sale_id: i64,
        status: SaleStatus,
        description: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: None,
            sale_id,
            status,
            description: description.into(),
            actor: Actor::System,
            created_at,
        }
    }
}
