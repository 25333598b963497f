use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use caseline_service::Providers;

use super::suite::{self, SpyOcr, StubRender, fax_message};

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn full_sync_twice_leaves_one_attachment_row_per_path() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!(
			"Skipping full_sync_twice_leaves_one_attachment_row_per_path; set CASELINE_PG_DSN to run this test."
		);

		return;
	};
	let calls = Arc::new(AtomicUsize::new(0));
	let ocr = SpyOcr { text: "recognized body".to_string(), calls: calls.clone() };
	let providers = Providers::new(Arc::new(ocr), Arc::new(StubRender));
	let cfg = suite::test_config(test_db.dsn().to_string());
	let service = suite::build_service(cfg, providers).await;
	let msg = fax_message("MSG-TWICE", "order");

	service.basic_sync(&msg).await.expect("Basic sync failed.");

	let first = service.full_sync(&msg).await.expect("First full sync failed.");
	let second = service.full_sync(&msg).await.expect("Second full sync failed.");

	// Re-running keeps the case identity stable instead of minting a second number.
	assert_eq!(first.management_no, second.management_no);
	assert_eq!(first.case_id, second.case_id);
	assert_eq!(calls.load(Ordering::SeqCst), 2, "OCR runs on every invocation.");

	let count: i64 =
		sqlx::query_scalar("SELECT count(*) FROM attachments WHERE message_id = $1")
			.bind("MSG-TWICE")
			.fetch_one(&service.db.pool)
			.await
			.expect("Attachment count must load.");

	assert_eq!(count, 1, "Exactly one attachment row per current path.");

	let documents: i64 =
		sqlx::query_scalar("SELECT count(*) FROM primary_documents WHERE message_id = $1")
			.bind("MSG-TWICE")
			.fetch_one(&service.db.pool)
			.await
			.expect("Primary document count must load.");

	assert_eq!(documents, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set CASELINE_PG_DSN to run."]
async fn ensure_case_converges_on_one_row() {
	let Some(test_db) = suite::test_db().await else {
		eprintln!(
			"Skipping ensure_case_converges_on_one_row; set CASELINE_PG_DSN to run this test."
		);

		return;
	};
	let providers = Providers::new(
		Arc::new(SpyOcr { text: "body".to_string(), calls: Arc::new(AtomicUsize::new(0)) }),
		Arc::new(StubRender),
	);
	let cfg = suite::test_config(test_db.dsn().to_string());
	let service = suite::build_service(cfg, providers).await;
	let msg = fax_message("MSG-ENSURE", "order");

	service.basic_sync(&msg).await.expect("First basic sync failed.");
	service.basic_sync(&msg).await.expect("Second basic sync failed.");

	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM cases WHERE management_no = $1")
		.bind("MSG-ENSURE")
		.fetch_one(&service.db.pool)
		.await
		.expect("Case count must load.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
