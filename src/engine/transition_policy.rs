// ==========================================
// 后台运营系统 - 状态流转判定引擎
// ==========================================
// 红线: 只追加，不覆盖人工维护的状态
// 红线: 每个判定都必须输出规则编号 (reason)
// ==========================================
// 输入: 记录的最新事件（可无） + 拟追加事件
// 输出: 接受 / 拒绝 + 命中规则
// ==========================================

use crate::domain::{Actor, SaleStatusEvent, ShipmentStatusEvent, StatusGate};
use std::fmt;

// ==========================================
// StatusEvent - 参与判定的事件视图
// ==========================================
pub trait StatusEvent {
    type Status: StatusGate;

    fn status(&self) -> Self::Status;
    fn actor(&self) -> &Actor;
}

impl StatusEvent for ShipmentStatusEvent {
    type Status = crate::domain::ShipmentStatus;

    fn status(&self) -> Self::Status {
        self.status
    }

    fn actor(&self) -> &Actor {
        &self.actor
    }
}

impl StatusEvent for SaleStatusEvent {
    type Status = crate::domain::SaleStatus;

    fn status(&self) -> Self::Status {
        self.status
    }

    fn actor(&self) -> &Actor {
        &self.actor
    }
}

// ==========================================
// 判定结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptRule {
    OpenGate,              // 最新状态处于开放闸门
    AutomatedStatusChange, // 自动→自动，且状态变化
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectRule {
    NoHistory,              // 无历史事件
    AutomatedDuplicate,     // 自动→自动，状态未变
    ManualHistoryProtected, // 任一方为人工事件
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDecision {
    Accept(AcceptRule),
    Reject(RejectRule),
}

impl TransitionDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, TransitionDecision::Accept(_))
    }

    /// 规则编号（用于日志）
    pub fn reason_code(&self) -> &'static str {
        match self {
            TransitionDecision::Accept(AcceptRule::OpenGate) => "STATUS_RULE_2_OPEN_GATE",
            TransitionDecision::Accept(AcceptRule::AutomatedStatusChange) => {
                "STATUS_RULE_3_AUTOMATED_CHANGE"
            }
            TransitionDecision::Reject(RejectRule::NoHistory) => "STATUS_RULE_1_NO_HISTORY",
            TransitionDecision::Reject(RejectRule::AutomatedDuplicate) => {
                "STATUS_RULE_3_AUTOMATED_DUPLICATE"
            }
            TransitionDecision::Reject(RejectRule::ManualHistoryProtected) => {
                "STATUS_RULE_4_MANUAL_PROTECTED"
            }
        }
    }
}

impl fmt::Display for TransitionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason_code())
    }
}

// ==========================================
// TransitionPolicy - 状态流转判定
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionPolicy;

impl TransitionPolicy {
    pub fn new() -> Self {
        Self
    }

    /// 判定是否追加拟写入事件
    ///
    /// 规则（顺序执行，命中即返回）:
    /// 1) 无最新事件 → 拒绝（首个事件不经由对账写入）
    /// 2) 最新状态为开放闸门 → 接受（不比较状态、不看操作人）
    /// 3) 最新与拟写入均为自动事件 → 状态不同才接受
    /// 4) 其他 → 拒绝
    pub fn evaluate<E: StatusEvent>(&self, latest: Option<&E>, proposed: &E) -> TransitionDecision {
        // 规则1
        let latest = match latest {
            Some(event) => event,
            None => return TransitionDecision::Reject(RejectRule::NoHistory),
        };

        // 规则2
        if latest.status().is_open_gate() {
            return TransitionDecision::Accept(AcceptRule::OpenGate);
        }

        // 规则3
        if latest.actor().is_automated() && proposed.actor().is_automated() {
            return if latest.status() != proposed.status() {
                TransitionDecision::Accept(AcceptRule::AutomatedStatusChange)
            } else {
                TransitionDecision::Reject(RejectRule::AutomatedDuplicate)
            };
        }

        // 规则4
        TransitionDecision::Reject(RejectRule::ManualHistoryProtected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SaleStatus, ShipmentStatus};
    use chrono::NaiveDateTime;

    fn at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 2, 3)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn shipment_event(status: ShipmentStatus, actor: Actor) -> ShipmentStatusEvent {
        ShipmentStatusEvent {
            actor,
            ..ShipmentStatusEvent::automated("TRK1", status, "", "", at())
        }
    }

    fn sale_event(status: SaleStatus, actor: Actor) -> SaleStatusEvent {
        SaleStatusEvent {
            actor,
            ..SaleStatusEvent::automated(1, status, "", at())
        }
    }

    fn user() -> Actor {
        Actor::User("u-7".to_string())
    }

    #[test]
    fn test_no_history_always_rejected() {
        let policy = TransitionPolicy::new();
        for status in ShipmentStatus::ALL {
            let proposed = shipment_event(status, Actor::System);
            assert_eq!(
                policy.evaluate(None, &proposed),
                TransitionDecision::Reject(RejectRule::NoHistory)
            );
        }
        let proposed = sale_event(SaleStatus::PendingLoad, user());
        assert!(!policy.evaluate(None, &proposed).is_accept());
    }

    #[test]
    fn test_inicial_accepts_even_same_status_and_manual_actor() {
        let policy = TransitionPolicy::new();
        let latest = shipment_event(ShipmentStatus::Inicial, user());

        let same = shipment_event(ShipmentStatus::Inicial, Actor::System);
        assert_eq!(
            policy.evaluate(Some(&latest), &same),
            TransitionDecision::Accept(AcceptRule::OpenGate)
        );

        let other = shipment_event(ShipmentStatus::Entregado, user());
        assert!(policy.evaluate(Some(&latest), &other).is_accept());
    }

    #[test]
    fn test_sale_open_gates_accept_unconditionally() {
        let policy = TransitionPolicy::new();
        for gate in [SaleStatus::PendingLoad, SaleStatus::CreatedDocsOk] {
            let latest = sale_event(gate, user());
            let proposed = sale_event(gate, Actor::System);
            assert_eq!(
                policy.evaluate(Some(&latest), &proposed),
                TransitionDecision::Accept(AcceptRule::OpenGate)
            );
        }
    }

    #[test]
    fn test_automated_dedup() {
        let policy = TransitionPolicy::new();
        let latest = shipment_event(ShipmentStatus::EnTransito, Actor::System);

        let same = shipment_event(ShipmentStatus::EnTransito, Actor::System);
        assert_eq!(
            policy.evaluate(Some(&latest), &same),
            TransitionDecision::Reject(RejectRule::AutomatedDuplicate)
        );

        let next = shipment_event(ShipmentStatus::EnReparto, Actor::System);
        assert_eq!(
            policy.evaluate(Some(&latest), &next),
            TransitionDecision::Accept(AcceptRule::AutomatedStatusChange)
        );
    }

    #[test]
    fn test_manual_history_is_protected() {
        let policy = TransitionPolicy::new();

        let manual_latest = sale_event(SaleStatus::Approved, user());
        let proposed = sale_event(SaleStatus::Activated, Actor::System);
        assert_eq!(
            policy.evaluate(Some(&manual_latest), &proposed),
            TransitionDecision::Reject(RejectRule::ManualHistoryProtected)
        );

        let auto_latest = sale_event(SaleStatus::Approved, Actor::System);
        let manual_proposed = sale_event(SaleStatus::Activated, user());
        assert_eq!(
            policy.evaluate(Some(&auto_latest), &manual_proposed),
            TransitionDecision::Reject(RejectRule::ManualHistoryProtected)
        );
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(
            TransitionDecision::Reject(RejectRule::NoHistory).to_string(),
            "STATUS_RULE_1_NO_HISTORY"
        );
        assert_eq!(
            TransitionDecision::Accept(AcceptRule::OpenGate).reason_code(),
            "STATUS_RULE_2_OPEN_GATE"
        );
    }
}
