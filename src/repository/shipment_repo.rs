// ==========================================
// 后台运营系统 - 运单/物流状态数据仓储
// ==========================================
// 对齐: shipment / shipment_status_event 表
// 红线: 状态事件只追加；"最新" = event_id 最大
// ==========================================

use crate::domain::{Actor, Shipment, ShipmentStatusEvent};
use crate::repository::codec::parse_text_column;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::status_repo::ShipmentStatusRepository;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const EVENT_COLUMNS: &str =
    "event_id, tracking_code, status, description, actor_id, location, created_at";

// ==========================================
// ShipmentRepositoryImpl
// ==========================================
pub struct ShipmentRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ShipmentRepositoryImpl {
    /// 创建新的运单仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增运单（种子数据/运维使用）
    pub fn insert_shipment(
        &self,
        tracking_code: &str,
        sale_id: Option<i64>,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO shipment (tracking_code, sale_id, created_at) VALUES (?1, ?2, ?3)",
            params![tracking_code, sale_id, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 查询运单号的完整状态历史（按追加顺序）
    pub fn list_events(&self, tracking_code: &str) -> RepositoryResult<Vec<ShipmentStatusEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shipment_status_event WHERE tracking_code = ?1 ORDER BY event_id ASC",
            EVENT_COLUMNS
        ))?;

        let events = stmt
            .query_map(params![tracking_code], map_event_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(events)
    }
}

fn map_event_row(row: &Row) -> SqliteResult<ShipmentStatusEvent> {
    Ok(ShipmentStatusEvent {
        event_id: Some(row.get(0)?),
        tracking_code: row.get(1)?,
        status: parse_text_column(2, row.get(2)?)?,
        description: row.get(3)?,
        actor: Actor::from_id(&row.get::<_, String>(4)?),
        location: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[async_trait]
impl ShipmentStatusRepository for ShipmentRepositoryImpl {
    async fn fetch_all_shipments(&self, page_size: usize) -> RepositoryResult<Vec<Shipment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT shipment_id, tracking_code, sale_id, created_at
            FROM shipment
            ORDER BY shipment_id ASC
            LIMIT ?1
            "#,
        )?;

        let shipments = stmt
            .query_map(params![page_size as i64], |row| {
                Ok(Shipment {
                    shipment_id: row.get(0)?,
                    tracking_code: row.get(1)?,
                    sale_id: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(shipments)
    }

    async fn get_latest_event(
        &self,
        tracking_code: &str,
    ) -> RepositoryResult<Option<ShipmentStatusEvent>> {
        let conn = self.get_conn()?;
        let event = conn
            .query_row(
                &format!(
                    "SELECT {} FROM shipment_status_event WHERE tracking_code = ?1 \
                     ORDER BY event_id DESC LIMIT 1",
                    EVENT_COLUMNS
                ),
                params![tracking_code],
                map_event_row,
            )
            .optional()?;
        Ok(event)
    }

    async fn append_event(&self, event: &ShipmentStatusEvent) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shipment_status_event (
                tracking_code, status, description, actor_id, location, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                event.tracking_code,
                event.status.as_str(),
                event.description,
                event.actor.id(),
                event.location,
                event.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShipmentStatus;

    fn setup_repo() -> ShipmentRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::configure_sqlite_connection(&conn).unwrap();
        crate::db::init_schema(&conn).unwrap();
        ShipmentRepositoryImpl::new(Arc::new(Mutex::new(conn)))
    }

    fn ts(h: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_latest_event_is_last_appended() {
        let repo = setup_repo();
        repo.insert_shipment("TRK1", None, ts(8)).unwrap();

        assert!(repo.get_latest_event("TRK1").await.unwrap().is_none());

        let first = ShipmentStatusEvent::automated("TRK1", ShipmentStatus::Inicial, "", "", ts(9));
        // 同一时间戳也必须按追加顺序区分
        let second = ShipmentStatusEvent::automated(
            "TRK1",
            ShipmentStatus::EnTransito,
            "paquete en camino",
            "Depot A",
            ts(9),
        );
        repo.append_event(&first).await.unwrap();
        let id = repo.append_event(&second).await.unwrap();

        let latest = repo.get_latest_event("TRK1").await.unwrap().unwrap();
        assert_eq!(latest.event_id, Some(id));
        assert_eq!(latest.status, ShipmentStatus::EnTransito);
        assert_eq!(latest.location, "Depot A");
        assert!(latest.actor.is_automated());

        assert_eq!(repo.list_events("TRK1").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_respects_page_size_and_order() {
        let repo = setup_repo();
        repo.insert_shipment("A", None, ts(1)).unwrap();
        repo.insert_shipment("B", None, ts(2)).unwrap();
        repo.insert_shipment("C", None, ts(3)).unwrap();

        let all = repo.fetch_all_shipments(100_000).await.unwrap();
        let codes: Vec<_> = all.iter().map(|s| s.tracking_code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);

        assert_eq!(repo.fetch_all_shipments(2).await.unwrap().len(), 2);
    }
}
