// ==========================================
// 后台运营系统 - 引擎层
// ==========================================
// 职责: 实现状态对账规则,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则必须输出 reason
// ==========================================

pub mod transition_policy;

// 重导出核心引擎
pub use transition_policy::{
    AcceptRule, RejectRule, StatusEvent, TransitionDecision, TransitionPolicy,
};
