use std::time::Duration as StdDuration;

use color_eyre::Result;
use time::{Duration, OffsetDateTime};
use tokio::time as tokio_time;

use caseline_domain::message::{IncomingMessage, MessageContent};
use caseline_service::CaseService;
use caseline_storage::{messages, models::MessageRow};

/// Batch re-processing loop. Claims leased batches of unfinished messages and drives each
/// through the Full phase; the lease window re-exposes rows whose worker died, so every
/// write downstream is idempotent (at-least-once).
pub async fn run_worker(service: CaseService) -> Result<()> {
	let poll_interval = StdDuration::from_millis(service.cfg.sync.poll_interval_ms as u64);

	loop {
		match process_batch_once(&service).await {
			Ok(0) => tokio_time::sleep(poll_interval).await,
			Ok(count) => {
				tracing::info!(count, "Processed message batch.");
			},
			Err(err) => {
				tracing::error!(error = %err, "Batch processing failed.");
				tokio_time::sleep(poll_interval).await;
			},
		}
	}
}

pub async fn process_batch_once(service: &CaseService) -> Result<usize> {
	let now = OffsetDateTime::now_utc();
	let window = Duration::seconds(service.cfg.sync.lease_seconds);
	let rows =
		messages::claim_batch(&service.db, now, window, service.cfg.sync.batch_size).await?;

	for row in &rows {
		if let Err(err) = process_message(service, row).await {
			tracing::error!(message_id = %row.message_id, error = %err, "Message processing failed.");

			// The failure is recorded and the lease released; `processed_at` stays null so
			// the scheduler retries the message later.
			messages::mark_ocr_error(
				&service.db,
				&row.message_id,
				&err.to_string(),
				OffsetDateTime::now_utc(),
			)
			.await?;
		}
	}

	Ok(rows.len())
}

async fn process_message(service: &CaseService, row: &MessageRow) -> Result<()> {
	let msg = incoming_from_row(service, row).await?;
	let response = service.full_sync(&msg).await?;

	tracing::info!(
		message_id = %row.message_id,
		management_no = %response.management_no,
		"Message finalized."
	);

	Ok(())
}

/// Rebuilds the inbound record from the stored row so an interrupted message can be driven
/// through the Full phase again.
async fn incoming_from_row(service: &CaseService, row: &MessageRow) -> Result<IncomingMessage> {
	let attachment_paths = messages::list_attachments(&service.db, &row.message_id)
		.await?
		.into_iter()
		.map(|attachment| attachment.object_path)
		.collect();
	let thumbnail = messages::find_primary_document(&service.db, &row.message_id)
		.await?
		.and_then(|document| document.thumbnail_path);

	Ok(IncomingMessage {
		id: row.message_id.clone(),
		subject: row.subject.clone(),
		sender: row.sender.clone(),
		recipient: row.recipient.clone(),
		received_at: row.received_at,
		snippet: row.snippet.clone(),
		content: content_from_columns(&row.kind, &row.body_kind, &row.body),
		attachment_paths,
		primary_document_path: row
			.primary_document_path
			.clone()
			.or_else(|| row.source_document_path.clone()),
		primary_document_thumbnail_path: thumbnail,
	})
}

fn content_from_columns(kind: &str, body_kind: &str, body: &str) -> MessageContent {
	match kind {
		"fax" =>
			if body_kind == "fax_ocr" && !body.trim().is_empty() {
				MessageContent::Fax { ocr: Some(body.to_string()) }
			} else {
				MessageContent::Fax { ocr: None }
			},
		_ =>
			if body_kind == "mail_rendered" {
				MessageContent::Mail { plain: String::new(), html: body.to_string() }
			} else {
				MessageContent::Mail { plain: body.to_string(), html: String::new() }
			},
	}
}
