use std::sync::Arc;

use caseline_service::{Providers, ServiceError};

use super::suite::{self, SlowOcr, StubRender, fax_message};

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn ocr_past_the_deadline_aborts_the_phase_and_keeps_basic_writes() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!(
			"Skipping ocr_past_the_deadline_aborts_the_phase_and_keeps_basic_writes; set CASELINE_PG_DSN to run this test."
		);

		return;
	};
	let providers = Providers::new(Arc::new(SlowOcr { delay_ms: 500 }), Arc::new(StubRender));
	let mut cfg = suite::test_config(test_db.dsn().to_string());

	cfg.sync.ocr_timeout_ms = 50;

	let service = suite::build_service(cfg, providers).await;
	let msg = fax_message("MSG-SLOW", "order");

	service.basic_sync(&msg).await.expect("Basic sync failed.");

	let result = service.full_sync(&msg).await;

	assert!(matches!(result, Err(ServiceError::Provider { .. })));

	// The Basic phase's writes stand; the message stays eligible for retry.
	let row = caseline_storage::messages::fetch_message(&service.db, "MSG-SLOW")
		.await
		.expect("Fetch failed.")
		.expect("Message row must exist.");

	assert_eq!(row.sync_state, "basic");
	assert!(row.processed_at.is_none());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
