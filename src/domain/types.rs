// ==========================================
// 后台运营系统 - 领域类型定义
// ==========================================
// 职责: 物流状态 / 销售状态 / 操作人 的封闭取值集合
// 红线: 字面值与外部导出文件保持一致（按字符串精确比较）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 自动化操作人的固定标识（导入批次写入的事件均使用该值）
pub const AUTOMATED_ACTOR_ID: &str = "00000000-0000-0000-0000-000000000000";

/// 状态字面值无法识别
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的{kind}状态: '{value}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

/// 状态生命周期的"开放闸门"
///
/// 最新事件处于开放闸门状态时，任何新状态都无条件接受。
pub trait StatusGate: Copy + Eq + fmt::Debug + fmt::Display {
    fn is_open_gate(&self) -> bool;
}

// ==========================================
// 物流状态 (Shipment Status)
// ==========================================
// 来源: 快递商导出文件 "Estado Guia" 列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    #[serde(rename = "INICIAL")]
    Inicial, // 初始（运单已创建）
    #[serde(rename = "PREPARANDO")]
    Preparando, // 备货中
    #[serde(rename = "EN TRANSITO")]
    EnTransito, // 运输中
    #[serde(rename = "EN SUCURSAL")]
    EnSucursal, // 到达网点
    #[serde(rename = "EN REPARTO")]
    EnReparto, // 派送中
    #[serde(rename = "ENTREGADO")]
    Entregado, // 已签收
    #[serde(rename = "NO ENTREGADO")]
    NoEntregado, // 派送失败
    #[serde(rename = "PENDIENTE DE RETIRO")]
    PendienteDeRetiro, // 待自提
    #[serde(rename = "DEVUELTO AL REMITENTE")]
    DevueltoAlRemitente, // 退回寄件人
    #[serde(rename = "SINIESTRADO")]
    Siniestrado, // 丢失/损毁
    #[serde(rename = "ANULADO")]
    Anulado, // 已作废
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 11] = [
        ShipmentStatus::Inicial,
        ShipmentStatus::Preparando,
        ShipmentStatus::EnTransito,
        ShipmentStatus::EnSucursal,
        ShipmentStatus::EnReparto,
        ShipmentStatus::Entregado,
        ShipmentStatus::NoEntregado,
        ShipmentStatus::PendienteDeRetiro,
        ShipmentStatus::DevueltoAlRemitente,
        ShipmentStatus::Siniestrado,
        ShipmentStatus::Anulado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Inicial => "INICIAL",
            ShipmentStatus::Preparando => "PREPARANDO",
            ShipmentStatus::EnTransito => "EN TRANSITO",
            ShipmentStatus::EnSucursal => "EN SUCURSAL",
            ShipmentStatus::EnReparto => "EN REPARTO",
            ShipmentStatus::Entregado => "ENTREGADO",
            ShipmentStatus::NoEntregado => "NO ENTREGADO",
            ShipmentStatus::PendienteDeRetiro => "PENDIENTE DE RETIRO",
            ShipmentStatus::DevueltoAlRemitente => "DEVUELTO AL REMITENTE",
            ShipmentStatus::Siniestrado => "SINIESTRADO",
            ShipmentStatus::Anulado => "ANULADO",
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        ShipmentStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus {
                kind: "物流",
                value: value.to_string(),
            })
    }
}

impl StatusGate for ShipmentStatus {
    fn is_open_gate(&self) -> bool {
        matches!(self, ShipmentStatus::Inicial)
    }
}

// ==========================================
// 销售状态 (Sale Status)
// ==========================================
// 来源: 销售系统导出文件 "Descripcion Estado" 列
// 顺序: 大致对应销售流水线先后
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleStatus {
    #[serde(rename = "PENDIENTE DE CARGA")]
    PendingLoad, // 待录入
    #[serde(rename = "CREADO DOCU OK")]
    CreatedDocsOk, // 已创建，资料齐全
    #[serde(rename = "CREADO SIN DOCU")]
    CreatedNoDocs, // 已创建，缺资料
    #[serde(rename = "DOCU RECHAZADA")]
    DocsRejected, // 资料被驳回
    #[serde(rename = "EN REVISION")]
    UnderReview, // 审核中
    #[serde(rename = "EN EVALUACION")]
    CreditEvaluation, // 信用评估中
    #[serde(rename = "APROBADA")]
    Approved, // 已批准
    #[serde(rename = "PENDIENTE PORTABILIDAD")]
    PendingPortability, // 待携号转网
    #[serde(rename = "PORTABILIDAD OK")]
    PortabilityOk, // 携号转网完成
    #[serde(rename = "PENDIENTE ACTIVACION")]
    PendingActivation, // 待激活
    #[serde(rename = "ACTIVADA")]
    Activated, // 已激活
    #[serde(rename = "EN DESPACHO")]
    Dispatched, // 配送中
    #[serde(rename = "ENTREGADA")]
    Delivered, // 已交付
    #[serde(rename = "RECHAZADA")]
    Rejected, // 已拒绝
    #[serde(rename = "ANULADA")]
    Cancelled, // 已作废
    #[serde(rename = "DESISTIDA")]
    Withdrawn, // 客户放弃
    #[serde(rename = "REPACTAR")]
    Renegotiate, // 需重新议定
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 17] = [
        SaleStatus::PendingLoad,
        SaleStatus::CreatedDocsOk,
        SaleStatus::CreatedNoDocs,
        SaleStatus::DocsRejected,
        SaleStatus::UnderReview,
        SaleStatus::CreditEvaluation,
        SaleStatus::Approved,
        SaleStatus::PendingPortability,
        SaleStatus::PortabilityOk,
        SaleStatus::PendingActivation,
        SaleStatus::Activated,
        SaleStatus::Dispatched,
        SaleStatus::Delivered,
        SaleStatus::Rejected,
        SaleStatus::Cancelled,
        SaleStatus::Withdrawn,
        SaleStatus::Renegotiate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::PendingLoad => "PENDIENTE DE CARGA",
            SaleStatus::CreatedDocsOk => "CREADO DOCU OK",
            SaleStatus::CreatedNoDocs => "CREADO SIN DOCU",
            SaleStatus::DocsRejected => "DOCU RECHAZADA",
            SaleStatus::UnderReview => "EN REVISION",
            SaleStatus::CreditEvaluation => "EN EVALUACION",
            SaleStatus::Approved => "APROBADA",
            SaleStatus::PendingPortability => "PENDIENTE PORTABILIDAD",
            SaleStatus::PortabilityOk => "PORTABILIDAD OK",
            SaleStatus::PendingActivation => "PENDIENTE ACTIVACION",
            SaleStatus::Activated => "ACTIVADA",
            SaleStatus::Dispatched => "EN DESPACHO",
            SaleStatus::Delivered => "ENTREGADA",
            SaleStatus::Rejected => "RECHAZADA",
            SaleStatus::Cancelled => "ANULADA",
            SaleStatus::Withdrawn => "DESISTIDA",
            SaleStatus::Renegotiate => "REPACTAR",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        SaleStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus {
                kind: "销售",
                value: value.to_string(),
            })
    }
}

impl StatusGate for SaleStatus {
    // 流水线最早的两个状态
    fn is_open_gate(&self) -> bool {
        matches!(self, SaleStatus::PendingLoad | SaleStatus::CreatedDocsOk)
    }
}

// ==========================================
// 操作人 (Actor)
// ==========================================
// 存储格式: actor_id 字符串，System 对应 AUTOMATED_ACTOR_ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Actor {
    System,       // 自动导入
    User(String), // 人工操作
}

impl Actor {
    pub fn from_id(id: &str) -> Self {
        if id == AUTOMATED_ACTOR_ID {
            Actor::System
        } else {
            Actor::User(id.to_string())
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Actor::System => AUTOMATED_ACTOR_ID,
            Actor::User(id) => id,
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, Actor::System)
    }
}

impl From<String> for Actor {
    fn from(id: String) -> Self {
        Actor::from_id(&id)
    }
}

impl From<Actor> for String {
    fn from(actor: Actor) -> Self {
        actor.id().to_string()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_status_literals_roundtrip() {
        for status in ShipmentStatus::ALL {
            assert_eq!(status.as_str().parse::<ShipmentStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&ShipmentStatus::EnTransito).unwrap(),
            "\"EN TRANSITO\""
        );
    }

    #[test]
    fn test_status_parse_trims_but_keeps_case() {
        assert_eq!(
            "  EN TRANSITO ".parse::<ShipmentStatus>().unwrap(),
            ShipmentStatus::EnTransito
        );
        assert!("en transito".parse::<ShipmentStatus>().is_err());
        assert!("ENTREGADA".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn test_open_gates() {
        let open: Vec<_> = ShipmentStatus::ALL
            .iter()
            .filter(|s| s.is_open_gate())
            .collect();
        assert_eq!(open, vec![&ShipmentStatus::Inicial]);

        let open: Vec<_> = SaleStatus::ALL.iter().filter(|s| s.is_open_gate()).collect();
        assert_eq!(
            open,
            vec![&SaleStatus::PendingLoad, &SaleStatus::CreatedDocsOk]
        );
    }

    #[test]
    fn test_actor_sentinel() {
        assert_eq!(Actor::from_id(AUTOMATED_ACTOR_ID), Actor::System);
        assert!(Actor::System.is_automated());

        let user = Actor::from_id("u-42");
        assert_eq!(user, Actor::User("u-42".to_string()));
        assert!(!user.is_automated());
        assert_eq!(user.id(), "u-42");
    }
}
