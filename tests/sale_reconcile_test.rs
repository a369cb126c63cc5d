// ==========================================
// 销售状态对账集成测试
// ==========================================
// 测试目标: 必需列校验、开放闸门、自动去重、人工状态保护
// ==========================================


use ventas_backoffice::config::ConfigManager;
use ventas_backoffice::domain::{Actor, SaleStatus};
use ventas_backoffice::importer::{
    AbortReason, ColumnOverrides, SaleField, StatusImporter,
};
use ventas_backoffice::logging;
use ventas_backoffice::repository::{SaleRepositoryImpl, ShipmentRepositoryImpl};
use test_helpers::{create_test_db, open_shared, operator, seed_sale, table, SALE_HEADERS};

type Importer = StatusImporter<ShipmentRepositoryImpl, SaleRepositoryImpl, ConfigManager>;

fn setup() -> (tempfile::NamedTempFile, Importer, SaleRepositoryImpl) {
    logging::init_test();

    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_shared(&db_path).expect("Failed to open db");

    let importer = StatusImporter::new(
        ShipmentRepositoryImpl::new(conn.clone()),
        SaleRepositoryImpl::new(conn.clone()),
        ConfigManager::from_connection(conn.clone()),
    );

    (temp_file, importer, SaleRepositoryImpl::new(conn))
}

fn no_overrides() -> ColumnOverrides<SaleField> {
    ColumnOverrides::new()
}

#[tokio::test]
async fn test_open_gates_accept_unconditionally() {
    let (_tmp, importer, sales) = setup();
    seed_sale(&sales, 1, "SDS-1", &[(SaleStatus::PendingLoad, operator())])
        .await
        .unwrap();
    seed_sale(&sales, 2, "SDS-2", &[(SaleStatus::CreatedDocsOk, operator())])
        .await
        .unwrap();

    // 与最新状态相同也接受
    let summary = importer
        .reconcile_sale_statuses(
            &table(&[
                SALE_HEADERS,
                &["SDS-1", "PENDIENTE DE CARGA", ""],
                &["SDS-2", "CREADO DOCU OK", ""],
            ]),
            &no_overrides(),
        )
        .await
        .unwrap();

    assert_eq!(summary.accepted, 2);
    assert_eq!(sales.list_events(1).unwrap().len(), 2);
    assert_eq!(sales.list_events(2).unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_sds_header_aborts_without_writes() {
    let (_tmp, importer, sales) = setup();
    seed_sale(&sales, 1, "SDS-1", &[(SaleStatus::PendingLoad, Actor::System)])
        .await
        .unwrap();

    let summary = importer
        .reconcile_sale_statuses(
            &table(&[
                &["Codigo", "Descripcion Estado"],
                &["SDS-1", "APROBADA"],
            ]),
            &no_overrides(),
        )
        .await
        .unwrap();

    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.matched_rows, 0);
    assert_eq!(
        summary.aborted,
        Some(AbortReason::MissingRequiredColumn(SaleField::SaleCode))
    );
    assert_eq!(sales.list_events(1).unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_status_header_aborts() {
    let (_tmp, importer, sales) = setup();
    seed_sale(&sales, 1, "SDS-1", &[(SaleStatus::PendingLoad, Actor::System)])
        .await
        .unwrap();

    let summary = importer
        .reconcile_sale_statuses(
            &table(&[&["SDS", "Estado"], &["SDS-1", "APROBADA"]]),
            &no_overrides(),
        )
        .await
        .unwrap();

    assert_eq!(
        summary.aborted,
        Some(AbortReason::MissingRequiredColumn(SaleField::Status))
    );
}

#[tokio::test]
async fn test_override_satisfies_required_column() {
    let (_tmp, importer, sales) = setup();
    seed_sale(&sales, 1, "SDS-1", &[(SaleStatus::PendingLoad, Actor::System)])
        .await
        .unwrap();

    let overrides = ColumnOverrides::new().with(SaleField::SaleCode, 2);
    let summary = importer
        .reconcile_sale_statuses(
            &table(&[
                &["Cliente", "Descripcion Estado", "Codigo"],
                &["ACME", "EN REVISION", "SDS-1"],
            ]),
            &overrides,
        )
        .await
        .unwrap();

    assert_eq!(summary.aborted, None);
    assert_eq!(summary.accepted, 1);
    assert_eq!(
        sales.list_events(1).unwrap()[1].status,
        SaleStatus::UnderReview
    );
}

#[tokio::test]
async fn test_trimmed_headers_and_status_cells() {
    let (_tmp, importer, sales) = setup();
    seed_sale(&sales, 1, "SDS-1", &[(SaleStatus::PendingLoad, Actor::System)])
        .await
        .unwrap();

    let summary = importer
        .reconcile_sale_statuses(
            &table(&[
                &[" SDS", "Descripcion Estado  ", "Observacion"],
                &["SDS-1", "  APROBADA ", "cliente llamo"],
            ]),
            &no_overrides(),
        )
        .await
        .unwrap();

    assert_eq!(summary.accepted, 1);
    let appended = &sales.list_events(1).unwrap()[1];
    assert_eq!(appended.status, SaleStatus::Approved);
    assert_eq!(appended.description, "cliente llamo");
    assert_eq!(appended.actor, Actor::System);
}

#[tokio::test]
async fn test_undefined_status_rows_are_skipped_not_fatal() {
    let (_tmp, importer, sales) = setup();
    seed_sale(&sales, 1, "SDS-1", &[(SaleStatus::PendingLoad, Actor::System)])
        .await
        .unwrap();
    seed_sale(&sales, 2, "SDS-2", &[(SaleStatus::PendingLoad, Actor::System)])
        .await
        .unwrap();
    seed_sale(&sales, 3, "SDS-3", &[(SaleStatus::PendingLoad, Actor::System)])
        .await
        .unwrap();

    let summary = importer
        .reconcile_sale_statuses(
            &table(&[
                SALE_HEADERS,
                &["SDS-1"],
                &["SDS-2", "EN PROCESO", ""],
                &["SDS-3", "APROBADA", ""],
            ]),
            &no_overrides(),
        )
        .await
        .unwrap();

    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.matched_rows, 3);
    assert_eq!(summary.accepted, 1);
    assert_eq!(sales.list_events(1).unwrap().len(), 1);
    assert_eq!(sales.list_events(2).unwrap().len(), 1);
    assert_eq!(sales.list_events(3).unwrap().len(), 2);
}

#[tokio::test]
async fn test_automated_history_dedup_and_manual_protection() {
    let (_tmp, importer, sales) = setup();
    seed_sale(
        &sales,
        1,
        "SDS-AUTO",
        &[
            (SaleStatus::PendingLoad, Actor::System),
            (SaleStatus::Approved, Actor::System),
        ],
    )
    .await
    .unwrap();
    seed_sale(
        &sales,
        2,
        "SDS-MANUAL",
        &[
            (SaleStatus::PendingLoad, Actor::System),
            (SaleStatus::Approved, operator()),
        ],
    )
    .await
    .unwrap();
    seed_sale(&sales, 3, "SDS-NEW", &[]).await.unwrap();

    let rows = table(&[
        SALE_HEADERS,
        &["SDS-AUTO", "APROBADA", ""],
        &["SDS-AUTO", "ACTIVADA", ""],
        &["SDS-MANUAL", "ACTIVADA", ""],
        &["SDS-NEW", "PENDIENTE DE CARGA", ""],
        &["SDS-UNKNOWN", "ACTIVADA", ""],
    ]);
    let summary = importer
        .reconcile_sale_statuses(&rows, &no_overrides())
        .await
        .unwrap();

    // 仅 SDS-AUTO 的 APROBADA → ACTIVADA 被接受
    assert_eq!(summary.total_rows, 5);
    assert_eq!(summary.matched_rows, 4);
    assert_eq!(summary.accepted, 1);
    assert_eq!(
        sales.list_events(1).unwrap().last().unwrap().status,
        SaleStatus::Activated
    );
    assert_eq!(sales.list_events(2).unwrap().len(), 2);
    assert!(sales.list_events(3).unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_sale_snapshot_returns_zero() {
    let (_tmp, importer, _sales) = setup();

    let summary = importer
        .reconcile_sale_statuses(
            &table(&[SALE_HEADERS, &["SDS-1", "APROBADA", ""]]),
            &no_overrides(),
        )
        .await
        .unwrap();

    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.aborted, Some(AbortReason::EmptySnapshot));
}
