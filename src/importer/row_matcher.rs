// ==========================================
// 后台运营系统 - 行匹配器
// ==========================================
// 职责: 按业务键把导入行对应到库中记录
// 输入: 整表快照（每批次读取一次）
// 规则:
// - 运单: 运单号精确相等的记录全部命中（运单号不保证唯一）
// - 销售: 销售编码精确相等时，快照顺序中最后一条为准
// - 不做大小写归一化、不做模糊匹配
// ==========================================

use crate::domain::{Sale, Shipment};
use std::collections::HashMap;

// ==========================================
// ShipmentMatcher - 运单匹配
// ==========================================
pub struct ShipmentMatcher<'a> {
    by_code: HashMap<&'a str, Vec<&'a Shipment>>,
}

impl<'a> ShipmentMatcher<'a> {
    /// 基于快照建立索引（保持快照顺序）
    pub fn new(snapshot: &'a [Shipment]) -> Self {
        let mut by_code: HashMap<&'a str, Vec<&'a Shipment>> = HashMap::new();
        for shipment in snapshot {
            by_code
                .entry(shipment.tracking_code.as_str())
                .or_default()
                .push(shipment);
        }
        Self { by_code }
    }

    /// 返回所有运单号相等的记录；未命中为空切片
    pub fn match_all(&self, tracking_code: &str) -> &[&'a Shipment] {
        self.by_code
            .get(tracking_code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ==========================================
// SaleMatcher - 销售单匹配
// ==========================================
pub struct SaleMatcher<'a> {
    by_code: HashMap<&'a str, &'a Sale>,
}

impl<'a> SaleMatcher<'a> {
    /// 基于快照建立索引；重复编码时后出现的覆盖先出现的
    pub fn new(snapshot: &'a [Sale]) -> Self {
        let mut by_code = HashMap::new();
        for sale in snapshot {
            by_code.insert(sale.sale_code.as_str(), sale);
        }
        Self { by_code }
    }

    pub fn match_last(&self, sale_code: &str) -> Option<&'a Sale> {
        self.by_code.get(sale_code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn epoch() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn shipment(id: i64, code: &str) -> Shipment {
        Shipment {
            shipment_id: id,
            tracking_code: code.to_string(),
            sale_id: None,
            created_at: epoch(),
        }
    }

    fn sale(id: i64, code: &str) -> Sale {
        Sale {
            sale_id: id,
            sale_code: code.to_string(),
            created_at: epoch(),
        }
    }

    #[test]
    fn test_shipment_matcher_returns_every_duplicate_in_order() {
        let snapshot = vec![shipment(1, "TRK1"), shipment(2, "TRK2"), shipment(3, "TRK1")];
        let matcher = ShipmentMatcher::new(&snapshot);

        let ids: Vec<_> = matcher
            .match_all("TRK1")
            .iter()
            .map(|s| s.shipment_id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(matcher.match_all("trk1").is_empty());
        assert!(matcher.match_all("TRK1 ").is_empty());
    }

    #[test]
    fn test_sale_matcher_last_wins() {
        let snapshot = vec![sale(10, "SDS-1"), sale(11, "SDS-2"), sale(12, "SDS-1")];
        let matcher = SaleMatcher::new(&snapshot);

        assert_eq!(matcher.match_last("SDS-1").map(|s| s.sale_id), Some(12));
        assert_eq!(matcher.match_last("SDS-2").map(|s| s.sale_id), Some(11));
        assert!(matcher.match_last("SDS-3").is_none());
    }
}
