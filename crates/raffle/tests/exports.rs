use raffle::config::RaffleConfig;
use raffle::error::RaffleError;
use raffle::export::{full_report, occupied_report, ReportKind, XLSX_MIME};
use raffle::testing::{TestBoard, TEST_ADMIN_KEY, TEST_VIEW_KEY};

#[tokio::test]
async fn full_export_always_has_100_rows() {
    let board = TestBoard::new().await;
    let svc = board.service();
    svc.claim("10", "Ana").await.unwrap();

    let slots = svc.snapshot().await.unwrap();
    let report = full_report(&slots, svc.config());
    assert_eq!(report.rows.len(), 100);
}

#[tokio::test]
async fn occupied_export_counts_taken_slots_times_price() {
    let board = TestBoard::with_config(RaffleConfig {
        price_per_slot: 1500.0,
        ..Default::default()
    })
    .await;
    let svc = board.service();
    for n in ["03", "30", "77", "99"] {
        svc.claim(n, "Ana").await.unwrap();
    }

    let slots = svc.snapshot().await.unwrap();
    let report = occupied_report(&slots, svc.config());
    assert_eq!(report.rows.len(), 4);
    assert_eq!(report.total, Some(6000.0));
}

#[tokio::test]
async fn export_requires_key_or_session() {
    let board = TestBoard::new().await;
    let svc = board.service();

    let err = svc
        .export(ReportKind::Full, Some("wrong"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RaffleError::Unauthorized));
    let err = svc.export(ReportKind::Full, None, Some("1")).await.unwrap_err();
    assert!(matches!(err, RaffleError::Unauthorized));

    let file = svc
        .export(ReportKind::Full, Some(TEST_ADMIN_KEY), None)
        .await
        .unwrap();
    assert_eq!(file.content_type, XLSX_MIME);
    assert!(file.file_name.starts_with("rifa_"));
    assert!(!file.bytes.is_empty());

    let token = svc.login(TEST_VIEW_KEY).unwrap().to_string();
    let file = svc
        .export(ReportKind::Occupied, None, Some(&token))
        .await
        .unwrap();
    assert!(file.file_name.starts_with("rifa_ocupados_"));
}

#[tokio::test]
async fn export_surfaces_storage_failure() {
    let board = TestBoard::new().await;
    board.store().set_unavailable(true);
    let err = board
        .service()
        .export(ReportKind::Occupied, Some(TEST_ADMIN_KEY), None)
        .await
        .unwrap_err();
    assert!(err.is_transient());
}
