// ==========================================
// 后台运营系统 - 状态对账API
// ==========================================
// 职责: 封装上传对账入口与批次历史查询
// 流程: 解析文件 → 解析列参数 → 批次编排 → 记录批次 → 返回更新数
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ReconcileConfigReader};
use crate::domain::{ReconcileKind, ReconcileRun, RunOutcome};
use crate::importer::{
    AbortReason, ColumnOverrides, ImportField, ReconcileSummary, SaleField, ShipmentField,
    StatusImporter, UniversalFileParser,
};
use crate::repository::{ReconcileRunRepository, SaleRepositoryImpl, ShipmentRepositoryImpl};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// SQLite 仓储上的批次编排器
pub type SqliteStatusImporter =
    StatusImporter<ShipmentRepositoryImpl, SaleRepositoryImpl, ConfigManager>;

/// 对账API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileApiResponse {
    /// 批次ID
    pub run_id: String,
    /// 对账类型
    pub kind: ReconcileKind,
    /// 数据行数（不含表头）
    pub total_rows: usize,
    /// 匹配到记录的行数
    pub matched_rows: usize,
    /// 追加的状态事件数
    pub updated: usize,
    /// 批次结局
    pub outcome: RunOutcome,
    /// 结果说明
    pub message: String,
    /// 耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 对账API
pub struct ReconcileApi {
    importer: Arc<SqliteStatusImporter>,
    run_repo: Arc<ReconcileRunRepository>,
    config: Arc<ConfigManager>,
    parser: UniversalFileParser,
}

impl ReconcileApi {
    pub fn new(
        importer: Arc<SqliteStatusImporter>,
        run_repo: Arc<ReconcileRunRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            importer,
            run_repo,
            config,
            parser: UniversalFileParser,
        }
    }

    /// 对磁盘上的导出文件执行对账
    ///
    /// # 参数
    /// - kind: 物流 / 销售
    /// - file_path: 文件路径（.csv / .xlsx / .xls）
    /// - overrides: `字段=列号` 形式的列参数
    /// - triggered_by: 触发人
    pub async fn reconcile_file(
        &self,
        kind: ReconcileKind,
        file_path: &str,
        overrides: &[String],
        triggered_by: &str,
    ) -> ApiResult<ReconcileApiResponse> {
        let table = self.parser.parse(file_path)?;
        let source_name = Path::new(file_path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        self.run(kind, &table, source_name, overrides, triggered_by)
            .await
    }

    /// 对上传内容执行对账（按原始文件名选择解析器）
    pub async fn reconcile_upload(
        &self,
        kind: ReconcileKind,
        file_name: &str,
        bytes: &[u8],
        overrides: &[String],
        triggered_by: &str,
    ) -> ApiResult<ReconcileApiResponse> {
        let table = self.parser.parse_upload(file_name, bytes)?;
        self.run(
            kind,
            &table,
            Some(file_name.to_string()),
            overrides,
            triggered_by,
        )
        .await
    }

    /// 对已解析的表格执行对账
    pub async fn reconcile_table(
        &self,
        kind: ReconcileKind,
        table: &[Vec<String>],
        overrides: &[String],
        triggered_by: &str,
    ) -> ApiResult<ReconcileApiResponse> {
        self.run(kind, table, None, overrides, triggered_by).await
    }

    /// 查询最近的批次（新 → 旧）
    ///
    /// # 参数
    /// - limit: 返回条数；None 时读取配置 reconcile/run_history_limit
    pub async fn list_recent_runs(&self, limit: Option<usize>) -> ApiResult<Vec<ReconcileRun>> {
        let limit = match limit {
            Some(0) => {
                return Err(ApiError::InvalidInput("limit 必须大于 0".to_string()));
            }
            Some(limit) => limit,
            None => self.config.get_run_history_limit().await?,
        };

        Ok(self.run_repo.list_recent(limit)?)
    }

    /// 查询单个批次
    pub fn get_run(&self, run_id: &str) -> ApiResult<ReconcileRun> {
        self.run_repo
            .find_by_id(run_id)?
            .ok_or_else(|| ApiError::NotFound(format!("ReconcileRun(id={})不存在", run_id)))
    }

    #[instrument(skip(self, table, overrides), fields(kind = %kind, run_id))]
    async fn run(
        &self,
        kind: ReconcileKind,
        table: &[Vec<String>],
        source_name: Option<String>,
        overrides: &[String],
        triggered_by: &str,
    ) -> ApiResult<ReconcileApiResponse> {
        if triggered_by.trim().is_empty() {
            return Err(ApiError::InvalidInput("触发人不能为空".to_string()));
        }

        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        let start_time = Instant::now();
        let started_at = Local::now().naive_local();

        let summary = self.dispatch(kind, table, overrides).await?;

        let outcome = match summary.aborted {
            None => RunOutcome::Completed,
            Some(AbortReason::EmptySnapshot) => RunOutcome::EmptySnapshot,
            Some(AbortReason::MissingRequiredColumn(_)) => RunOutcome::MissingColumn,
        };

        let run = ReconcileRun {
            run_id: run_id.clone(),
            kind,
            source_name,
            total_rows: summary.total_rows,
            accepted: summary.accepted,
            outcome,
            triggered_by: triggered_by.to_string(),
            started_at,
            finished_at: Local::now().naive_local(),
        };
        self.run_repo.insert(&run)?;

        // 缺少必需列: 批次已记录，对调用方报请求错误
        if let Some(AbortReason::MissingRequiredColumn(field)) = summary.aborted {
            warn!(run_id = %run_id, field = field.header_label(), "对账批次因缺列中止");
            return Err(ApiError::InvalidInput(format!(
                "缺少必需列: {}（可用 {}=列号 指定）",
                field.header_label(),
                field.override_key()
            )));
        }

        let message = match summary.aborted {
            Some(AbortReason::EmptySnapshot) => "库中无可对账记录，未做任何更新".to_string(),
            _ => format!("{} records updated", summary.accepted),
        };

        info!(
            run_id = %run_id,
            updated = summary.accepted,
            total_rows = summary.total_rows,
            outcome = %outcome,
            "对账批次完成"
        );

        Ok(ReconcileApiResponse {
            run_id,
            kind,
            total_rows: summary.total_rows,
            matched_rows: summary.matched_rows,
            updated: summary.accepted,
            outcome,
            message,
            elapsed_ms: start_time.elapsed().as_millis() as i64,
        })
    }

    async fn dispatch(
        &self,
        kind: ReconcileKind,
        table: &[Vec<String>],
        overrides: &[String],
    ) -> ApiResult<ReconcileSummary> {
        let summary = match kind {
            ReconcileKind::Shipment => {
                let overrides = ColumnOverrides::<ShipmentField>::parse_pairs(overrides)?;
                self.importer
                    .reconcile_shipment_statuses(table, &overrides)
                    .await?
            }
            ReconcileKind::Sale => {
                let overrides = ColumnOverrides::<SaleField>::parse_pairs(overrides)?;
                self.importer
                    .reconcile_sale_statuses(table, &overrides)
                    .await?
            }
        };
        Ok(summary)
    }
}
