// ==========================================
// 后台运营系统 - 状态对账批次编排
// ==========================================
// 职责: 驱动一次上传的完整对账流程
// 流程: 表头定位 → 读取快照 → 逐行匹配 → 规则判定 → 追加事件
// 红线: 单行被拒绝/未匹配不影响后续行；仓储错误直接中止批次
// 红线: 不做整批事务，已追加的事件保留
// ==========================================

use crate::config::ReconcileConfigReader;
use crate::domain::{SaleStatus, SaleStatusEvent, ShipmentStatus, ShipmentStatusEvent};
use crate::engine::TransitionPolicy;
use crate::importer::column_resolver::{
    ColumnOverrides, ColumnResolver, HeaderMatch, ImportField, SaleField, ShipmentField,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::row_matcher::{SaleMatcher, ShipmentMatcher};
use crate::repository::{SaleStatusRepository, ShipmentStatusRepository};
use chrono::Local;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument, warn};

// ==========================================
// 批次结果
// ==========================================

/// 批次中止原因（软中止，不视为错误）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbortReason {
    /// 快照为空，无可对账记录
    EmptySnapshot,
    /// 销售导入缺少必需列
    MissingRequiredColumn(SaleField),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::EmptySnapshot => write!(f, "快照为空"),
            AbortReason::MissingRequiredColumn(field) => {
                write!(f, "缺少必需列: {}", field.header_label())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub accepted: usize,                // 追加的事件数（对外唯一结果）
    pub total_rows: usize,              // 数据行数（不含表头）
    pub matched_rows: usize,            // 至少匹配到一条记录的行数
    pub aborted: Option<AbortReason>,   // 中止原因
}

impl ReconcileSummary {
    fn aborted(total_rows: usize, reason: AbortReason) -> Self {
        Self {
            accepted: 0,
            total_rows,
            matched_rows: 0,
            aborted: Some(reason),
        }
    }
}

// ==========================================
// StatusImporter - 批次编排器
// ==========================================
pub struct StatusImporter<S, L, C>
where
    S: ShipmentStatusRepository,
    L: SaleStatusRepository,
    C: ReconcileConfigReader,
{
    shipment_repo: S,
    sale_repo: L,
    config: C,
    policy: TransitionPolicy,
}

impl<S, L, C> StatusImporter<S, L, C>
where
    S: ShipmentStatusRepository,
    L: SaleStatusRepository,
    C: ReconcileConfigReader,
{
    pub fn new(shipment_repo: S, sale_repo: L, config: C) -> Self {
        Self {
            shipment_repo,
            sale_repo,
            config,
            policy: TransitionPolicy::new(),
        }
    }

    /// 物流状态对账
    ///
    /// # 参数
    /// - table: 第 0 行为表头，其余为数据行
    /// - overrides: 人工指定列号（优先于表头扫描）
    ///
    /// # 说明
    /// - 表头精确匹配；未定位的字段一律读第 0 列
    /// - 同一运单号的多条运单逐条判定，每条都可能追加事件
    #[instrument(skip(self, table, overrides), fields(rows = table.len()))]
    pub async fn reconcile_shipment_statuses(
        &self,
        table: &[Vec<String>],
        overrides: &ColumnOverrides<ShipmentField>,
    ) -> ImportResult<ReconcileSummary> {
        let (headers, rows) = table.split_first().ok_or(ImportError::EmptyTable)?;

        let columns = ColumnResolver::new(HeaderMatch::Exact).resolve(headers, overrides);
        let unresolved = columns.unresolved();
        if !unresolved.is_empty() {
            warn!(fields = ?unresolved, "物流导入存在未定位的列，按第 0 列读取");
        }
        let columns = columns.with_fallback(0);

        let page_size = self.config.get_snapshot_page_size().await?;
        let snapshot = self.shipment_repo.fetch_all_shipments(page_size).await?;
        if snapshot.is_empty() {
            warn!("运单快照为空，跳过对账");
            return Ok(ReconcileSummary::aborted(
                rows.len(),
                AbortReason::EmptySnapshot,
            ));
        }
        let matcher = ShipmentMatcher::new(&snapshot);

        let mut accepted = 0;
        let mut matched_rows = 0;

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;

            let tracking_code = match columns.cell(row, ShipmentField::TrackingCode) {
                Some(code) => code,
                None => {
                    debug!(row_number, "运单号单元格缺失，跳过");
                    continue;
                }
            };

            let candidates = matcher.match_all(tracking_code);
            if candidates.is_empty() {
                debug!(row_number, tracking_code, "未匹配到运单，跳过");
                continue;
            }
            matched_rows += 1;

            let status = match columns
                .cell(row, ShipmentField::Status)
                .map(str::parse::<ShipmentStatus>)
            {
                Some(Ok(status)) => status,
                Some(Err(e)) => {
                    debug!(row_number, tracking_code, error = %e, "状态无法识别，跳过");
                    continue;
                }
                None => {
                    debug!(row_number, tracking_code, "状态单元格缺失，跳过");
                    continue;
                }
            };
            let description = columns
                .cell(row, ShipmentField::Description)
                .unwrap_or_default();
            let location = columns.cell(row, ShipmentField::Location).unwrap_or_default();

            for shipment in candidates {
                let proposed = ShipmentStatusEvent::automated(
                    shipment.tracking_code.as_str(),
                    status,
                    description,
                    location,
                    Local::now().naive_local(),
                );

                // 每条候选单独读取最新事件（前一条候选刚追加的事件可见）
                let latest = self
                    .shipment_repo
                    .get_latest_event(&shipment.tracking_code)
                    .await?;

                let decision = self.policy.evaluate(latest.as_ref(), &proposed);
                if !decision.is_accept() {
                    debug!(
                        row_number,
                        shipment_id = shipment.shipment_id,
                        reason = %decision,
                        "拒绝追加物流事件"
                    );
                    continue;
                }

                let event_id = self.shipment_repo.append_event(&proposed).await?;
                debug!(
                    row_number,
                    shipment_id = shipment.shipment_id,
                    event_id,
                    status = %status,
                    reason = %decision,
                    "追加物流事件"
                );
                accepted += 1;
            }
        }

        info!(
            total_rows = rows.len(),
            matched_rows,
            accepted,
            "物流状态对账完成"
        );

        Ok(ReconcileSummary {
            accepted,
            total_rows: rows.len(),
            matched_rows,
            aborted: None,
        })
    }

    /// 销售状态对账
    ///
    /// # 参数
    /// - table: 第 0 行为表头，其余为数据行
    /// - overrides: 人工指定列号（优先于表头扫描）
    ///
    /// # 说明
    /// - 表头去首尾空白后匹配；SDS / Descripcion Estado 缺失时整批中止
    /// - 同一销售编码以快照中最后一条为准
    #[instrument(skip(self, table, overrides), fields(rows = table.len()))]
    pub async fn reconcile_sale_statuses(
        &self,
        table: &[Vec<String>],
        overrides: &ColumnOverrides<SaleField>,
    ) -> ImportResult<ReconcileSummary> {
        let (headers, rows) = table.split_first().ok_or(ImportError::EmptyTable)?;

        let columns = ColumnResolver::new(HeaderMatch::Trimmed).resolve(headers, overrides);
        if let Some(field) = columns.first_missing(SaleField::REQUIRED) {
            warn!(field = field.header_label(), "销售导入缺少必需列，中止批次");
            return Ok(ReconcileSummary::aborted(
                rows.len(),
                AbortReason::MissingRequiredColumn(field),
            ));
        }

        let page_size = self.config.get_snapshot_page_size().await?;
        let snapshot = self.sale_repo.fetch_all_sales(page_size).await?;
        if snapshot.is_empty() {
            warn!("销售单快照为空，跳过对账");
            return Ok(ReconcileSummary::aborted(
                rows.len(),
                AbortReason::EmptySnapshot,
            ));
        }
        let matcher = SaleMatcher::new(&snapshot);

        let mut accepted = 0;
        let mut matched_rows = 0;

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;

            let sale_code = match columns.cell(row, SaleField::SaleCode) {
                Some(code) => code,
                None => {
                    debug!(row_number, "销售编码单元格缺失，跳过");
                    continue;
                }
            };

            let sale = match matcher.match_last(sale_code) {
                Some(sale) => sale,
                None => {
                    debug!(row_number, sale_code, "未匹配到销售单，跳过");
                    continue;
                }
            };
            matched_rows += 1;

            let status = match columns
                .cell(row, SaleField::Status)
                .map(str::parse::<SaleStatus>)
            {
                Some(Ok(status)) => status,
                Some(Err(e)) => {
                    debug!(row_number, sale_code, error = %e, "状态无法识别，跳过");
                    continue;
                }
                None => {
                    debug!(row_number, sale_code, "状态单元格缺失，跳过");
                    continue;
                }
            };
            let description = columns
                .cell(row, SaleField::Description)
                .unwrap_or_default();

            let proposed = SaleStatusEvent::automated(
                sale.sale_id,
                status,
                description,
                Local::now().naive_local(),
            );

            let latest = self.sale_repo.get_latest_event(sale.sale_id).await?;
            let decision = self.policy.evaluate(latest.as_ref(), &proposed);
            if !decision.is_accept() {
                debug!(
                    row_number,
                    sale_id = sale.sale_id,
                    reason = %decision,
                    "拒绝追加销售事件"
                );
                continue;
            }

            let event_id = self.sale_repo.append_event(&proposed).await?;
            debug!(
                row_number,
                sale_id = sale.sale_id,
                event_id,
                status = %status,
                reason = %decision,
                "追加销售事件"
            );
            accepted += 1;
        }

        info!(
            total_rows = rows.len(),
            matched_rows,
            accepted,
            "销售状态对账完成"
        );

        Ok(ReconcileSummary {
            accepted,
            total_rows: rows.len(),
            matched_rows,
            aborted: None,
        })
    }
}
