use caseline_service::Providers;
use std::sync::Arc;

use super::suite::{self, StubOcr, StubRender, fax_message};

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn fax_with_explicit_code_and_alias_resolves_end_to_end() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!(
			"Skipping fax_with_explicit_code_and_alias_resolves_end_to_end; set CASELINE_PG_DSN to run this test."
		);

		return;
	};
	let ocr = StubOcr {
		text: "Order confirmation from Acme Trading. Case No.: A00123. TEL: 0312345678"
			.to_string(),
	};
	let providers = Providers::new(Arc::new(ocr), Arc::new(StubRender));
	let cfg = suite::test_config(test_db.dsn().to_string());
	let service = suite::build_service(cfg, providers).await;

	suite::seed_customer(&service, "acme", "Acme Trading", &[], &[], &["Acme"]).await;

	// An earlier message already lives under the explicit code, so the token is trusted.
	let earlier = fax_message("MSG-EARLIER", "initial order");

	service.basic_sync(&earlier).await.expect("Basic sync failed.");
	caseline_storage::cases::migrate_management_no(&service.db, "MSG-EARLIER", "A00123")
		.await
		.expect("Migration failed.");

	let msg = fax_message("MSG-REPLY", "re: order");
	let basic = service.basic_sync(&msg).await.expect("Basic sync failed.");

	assert!(!basic.skipped);

	let full = service.full_sync(&msg).await.expect("Full sync failed.");

	assert_eq!(full.management_no, "A00123");

	let customer = full.customer.expect("Customer must resolve.");

	assert_eq!(customer.id, "acme");
	assert_eq!(customer.name, "Acme Trading");

	let row = caseline_storage::messages::fetch_message(&service.db, "MSG-REPLY")
		.await
		.expect("Fetch failed.")
		.expect("Message row must exist.");

	assert_eq!(row.body_kind, "fax_ocr");
	assert_eq!(row.sync_state, "full");
	assert!(row.processed_at.is_some());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn unknown_explicit_code_is_advisory_only() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!(
			"Skipping unknown_explicit_code_is_advisory_only; set CASELINE_PG_DSN to run this test."
		);

		return;
	};
	let ocr = StubOcr { text: "Case No.: FFFFF0 but nobody has seen it".to_string() };
	let providers = Providers::new(Arc::new(ocr), Arc::new(StubRender));
	let cfg = suite::test_config(test_db.dsn().to_string());
	let service = suite::build_service(cfg, providers).await;
	let msg = fax_message("MSG-NEW", "new order");
	let full = service.full_sync(&msg).await.expect("Full sync failed.");

	// Freshly allocated, not the advisory token.
	assert_ne!(full.management_no, "FFFFF0");
	assert_eq!(full.management_no, "00001");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn mail_alias_beats_name_alias_in_two_pass_matching() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!(
			"Skipping mail_alias_beats_name_alias_in_two_pass_matching; set CASELINE_PG_DSN to run this test."
		);

		return;
	};
	let providers = Providers::new(
		Arc::new(StubOcr { text: String::new() }),
		Arc::new(StubRender),
	);
	let cfg = suite::test_config(test_db.dsn().to_string());
	let service = suite::build_service(cfg, providers).await;

	suite::seed_customer(&service, "beta", "Beta Industries", &[], &[], &["Acme"]).await;
	suite::seed_customer(&service, "acme", "Acme Trading", &["a@x.com"], &[], &[]).await;

	let msg = suite::mail_message("MSG-MAIL", "order from Acme", "From: a@x.com about Acme");
	let full = service.full_sync(&msg).await.expect("Full sync failed.");
	let customer = full.customer.expect("Customer must resolve.");

	assert_eq!(customer.id, "acme");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
