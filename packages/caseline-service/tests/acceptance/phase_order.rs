use std::sync::Arc;

use caseline_service::Providers;

use super::suite::{self, StubOcr, StubRender, fax_message};

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn basic_after_full_does_not_regress_finalized_fields() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!(
			"Skipping basic_after_full_does_not_regress_finalized_fields; set CASELINE_PG_DSN to run this test."
		);

		return;
	};
	let ocr = StubOcr { text: "recognized body".to_string() };
	let providers = Providers::new(Arc::new(ocr), Arc::new(StubRender));
	let cfg = suite::test_config(test_db.dsn().to_string());
	let service = suite::build_service(cfg, providers).await;
	let msg = fax_message("MSG-LATE", "order");

	service.basic_sync(&msg).await.expect("Basic sync failed.");
	service.full_sync(&msg).await.expect("Full sync failed.");

	// A duplicate trigger delivered late.
	let late = service.basic_sync(&msg).await.expect("Late basic sync failed.");

	assert!(late.skipped);

	let row = caseline_storage::messages::fetch_message(&service.db, "MSG-LATE")
		.await
		.expect("Fetch failed.")
		.expect("Message row must exist.");

	assert_eq!(row.sync_state, "full");
	assert_eq!(row.body, "recognized body");
	assert_eq!(row.body_kind, "fax_ocr");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn full_before_basic_is_safe() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!("Skipping full_before_basic_is_safe; set CASELINE_PG_DSN to run this test.");

		return;
	};
	let ocr = StubOcr { text: "recognized body".to_string() };
	let providers = Providers::new(Arc::new(ocr), Arc::new(StubRender));
	let cfg = suite::test_config(test_db.dsn().to_string());
	let service = suite::build_service(cfg, providers).await;
	let msg = fax_message("MSG-OOO", "order");

	// Out-of-order completion: the Full trigger lands first.
	let full = service.full_sync(&msg).await.expect("Full sync failed.");
	let basic = service.basic_sync(&msg).await.expect("Basic sync failed.");

	assert!(basic.skipped, "Basic after Full must not rewrite the finalized row.");
	assert_eq!(basic.case_id, full.case_id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
