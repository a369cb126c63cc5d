// ==========================================
// 后台运营系统 - 对账批次记录
// ==========================================
// 用途: 记录每次上传对账的结果，供追溯
// 对齐: reconcile_run 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// ReconcileKind - 对账类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileKind {
    Shipment, // 物流状态
    Sale,     // 销售状态
}

impl fmt::Display for ReconcileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileKind::Shipment => write!(f, "SHIPMENT"),
            ReconcileKind::Sale => write!(f, "SALE"),
        }
    }
}

impl FromStr for ReconcileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SHIPMENT" => Ok(ReconcileKind::Shipment),
            "SALE" => Ok(ReconcileKind::Sale),
            other => Err(format!("未知的对账类型: {}", other)),
        }
    }
}

// ==========================================
// RunOutcome - 批次结局
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Completed,     // 逐行处理完成
    EmptySnapshot, // 库中无可对账记录
    MissingColumn, // 缺少必需列
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "COMPLETED"),
            RunOutcome::EmptySnapshot => write!(f, "EMPTY_SNAPSHOT"),
            RunOutcome::MissingColumn => write!(f, "MISSING_COLUMN"),
        }
    }
}

impl FromStr for RunOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "COMPLETED" => Ok(RunOutcome::Completed),
            "EMPTY_SNAPSHOT" => Ok(RunOutcome::EmptySnapshot),
            "MISSING_COLUMN" => Ok(RunOutcome::MissingColumn),
            other => Err(format!("未知的批次结局: {}", other)),
        }
    }
}

// ==========================================
// ReconcileRun - 对账批次
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileRun {
    pub run_id: String,              // 批次 ID（UUID）
    pub kind: ReconcileKind,         // 对账类型
    pub source_name: Option<String>, // 源文件名
    pub total_rows: usize,           // 数据行数（不含表头）
    pub accepted: usize,             // 实际追加的事件数
    pub outcome: RunOutcome,         // 结局
    pub triggered_by: String,        // 触发人
    pub started_at: NaiveDateTime,   // 开始时间
    pub finished_at: NaiveDateTime,  // 结束时间
}
