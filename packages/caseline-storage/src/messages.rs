use sqlx::QueryBuilder;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
	Result,
	db::Db,
	models::{AttachmentRow, MessageRow, PrimaryDocumentRow},
};

pub struct UpsertMessageArgs<'a> {
	pub message_id: &'a str,
	pub case_id: Uuid,
	pub kind: &'a str,
	pub subject: &'a str,
	pub sender: &'a str,
	pub recipient: &'a str,
	pub received_at: OffsetDateTime,
	pub snippet: &'a str,
	pub body: &'a str,
	pub body_kind: &'a str,
	pub primary_document_path: Option<&'a str>,
	/// Where the captured original lives, known from the Basic phase on. The mirror-visible
	/// `primary_document_path` stays null until the Full phase resolves it.
	pub source_document_path: Option<&'a str>,
	pub ocr_status: &'a str,
}

/// Basic-phase upsert. The conflict clause is gated on `sync_state <> 'full'`, so a late
/// duplicate Basic trigger can never regress a finalized row.
pub async fn upsert_message_basic(db: &Db, args: UpsertMessageArgs<'_>) -> Result<()> {
	upsert_message(db, args, "basic", true).await
}

/// Full-phase upsert. Unconditional; marks the row finalized.
pub async fn upsert_message_full(db: &Db, args: UpsertMessageArgs<'_>) -> Result<()> {
	upsert_message(db, args, "full", false).await
}

async fn upsert_message(
	db: &Db,
	args: UpsertMessageArgs<'_>,
	sync_state: &str,
	guard_finalized: bool,
) -> Result<()> {
	let now = OffsetDateTime::now_utc();
	let guard = if guard_finalized { "WHERE messages.sync_state <> 'full'" } else { "" };
	let sql = format!(
		"\
INSERT INTO messages (
	message_id,
	case_id,
	kind,
	subject,
	sender,
	recipient,
	received_at,
	snippet,
	body,
	body_kind,
	primary_document_path,
	source_document_path,
	sync_state,
	ocr_status,
	ocr_error,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NULL, $15, $15)
ON CONFLICT (message_id) DO UPDATE
SET
	case_id = EXCLUDED.case_id,
	subject = EXCLUDED.subject,
	sender = EXCLUDED.sender,
	recipient = EXCLUDED.recipient,
	received_at = EXCLUDED.received_at,
	snippet = EXCLUDED.snippet,
	body = EXCLUDED.body,
	body_kind = EXCLUDED.body_kind,
	primary_document_path = EXCLUDED.primary_document_path,
	source_document_path = EXCLUDED.source_document_path,
	sync_state = EXCLUDED.sync_state,
	ocr_status = EXCLUDED.ocr_status,
	ocr_error = NULL,
	updated_at = EXCLUDED.updated_at
{guard}",
	);

	sqlx::query(&sql)
		.bind(args.message_id)
		.bind(args.case_id)
		.bind(args.kind)
		.bind(args.subject)
		.bind(args.sender)
		.bind(args.recipient)
		.bind(args.received_at)
		.bind(args.snippet)
		.bind(args.body)
		.bind(args.body_kind)
		.bind(args.primary_document_path)
		.bind(args.source_document_path)
		.bind(sync_state)
		.bind(args.ocr_status)
		.bind(now)
		.execute(&db.pool)
		.await?;

	Ok(())
}

pub async fn list_attachments(db: &Db, message_id: &str) -> Result<Vec<AttachmentRow>> {
	let rows = sqlx::query_as::<_, AttachmentRow>(
		"SELECT * FROM attachments WHERE message_id = $1 ORDER BY object_path",
	)
	.bind(message_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn find_primary_document(
	db: &Db,
	message_id: &str,
) -> Result<Option<PrimaryDocumentRow>> {
	let row = sqlx::query_as::<_, PrimaryDocumentRow>(
		"SELECT * FROM primary_documents WHERE message_id = $1",
	)
	.bind(message_id)
	.fetch_optional(&db.pool)
	.await?;

	Ok(row)
}

pub async fn fetch_message(db: &Db, message_id: &str) -> Result<Option<MessageRow>> {
	let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE message_id = $1")
		.bind(message_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(row)
}

/// Replaces the full attachment set for a message. Delete and bulk insert run in one
/// transaction, so a crash mid-replace never leaves the message with zero attachments.
pub async fn replace_attachments(
	db: &Db,
	case_id: Uuid,
	message_id: &str,
	paths: &[String],
) -> Result<()> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM attachments WHERE message_id = $1")
		.bind(message_id)
		.execute(&mut *tx)
		.await?;

	if !paths.is_empty() {
		let now = OffsetDateTime::now_utc();
		let mut builder = QueryBuilder::new(
			"\
INSERT INTO attachments (
	attachment_id,
	case_id,
	message_id,
	object_path,
	filename,
	mime,
	created_at
) ",
		);

		builder.push_values(paths, |mut b, path| {
			b.push_bind(Uuid::new_v4())
				.push_bind(case_id)
				.push_bind(message_id)
				.push_bind(path)
				.push_bind(filename_of(path))
				.push_bind(mime_for_path(path))
				.push_bind(now);
		});
		builder.build().execute(&mut *tx).await?;
	}

	tx.commit().await?;

	Ok(())
}

/// Same replace-whole-set discipline for the single canonical document of a message.
pub async fn replace_primary_document(
	db: &Db,
	case_id: Uuid,
	message_id: &str,
	path: &str,
	thumbnail_path: Option<&str>,
	file_type: &str,
) -> Result<()> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM primary_documents WHERE message_id = $1")
		.bind(message_id)
		.execute(&mut *tx)
		.await?;
	sqlx::query(
		"\
INSERT INTO primary_documents (
	document_id,
	case_id,
	message_id,
	object_path,
	thumbnail_path,
	file_type,
	mime,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
	)
	.bind(Uuid::new_v4())
	.bind(case_id)
	.bind(message_id)
	.bind(path)
	.bind(thumbnail_path)
	.bind(file_type)
	.bind(mime_for_path(path))
	.bind(OffsetDateTime::now_utc())
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

/// Claims up to `limit` unprocessed rows for the lease window and stamps them. Rows whose
/// lease is older than the window are re-claimable; there is no lease renewal, so the
/// downstream writes must stay idempotent.
pub async fn claim_batch(
	db: &Db,
	now: OffsetDateTime,
	lock_window: Duration,
	limit: i64,
) -> Result<Vec<MessageRow>> {
	let stale_before = now - lock_window;
	let mut tx = db.pool.begin().await?;
	let mut rows = sqlx::query_as::<_, MessageRow>(
		"\
SELECT *
FROM messages
WHERE processed_at IS NULL
	AND (processing_at IS NULL OR processing_at < $1)
ORDER BY received_at ASC
LIMIT $2
FOR UPDATE SKIP LOCKED",
	)
	.bind(stale_before)
	.bind(limit)
	.fetch_all(&mut *tx)
	.await?;

	if !rows.is_empty() {
		let ids: Vec<String> = rows.iter().map(|row| row.message_id.clone()).collect();

		sqlx::query("UPDATE messages SET processing_at = $1 WHERE message_id = ANY($2)")
			.bind(now)
			.bind(&ids)
			.execute(&mut *tx)
			.await?;

		for row in &mut rows {
			row.processing_at = Some(now);
		}
	}

	tx.commit().await?;

	Ok(rows)
}

pub async fn mark_processed(db: &Db, message_id: &str, now: OffsetDateTime) -> Result<()> {
	sqlx::query(
		"\
UPDATE messages
SET processed_at = $2, processing_at = NULL, updated_at = $2
WHERE message_id = $1",
	)
	.bind(message_id)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Records an OCR failure and releases the lease. `processed_at` stays null, so the lease
/// scheduler retries the message later.
pub async fn mark_ocr_error(
	db: &Db,
	message_id: &str,
	error: &str,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE messages
SET ocr_status = 'error', ocr_error = $2, processing_at = NULL, updated_at = $3
WHERE message_id = $1",
	)
	.bind(message_id)
	.bind(error)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(())
}

fn filename_of(path: &str) -> &str {
	path.rsplit('/').next().unwrap_or(path)
}

fn mime_for_path(path: &str) -> &'static str {
	let extension = path.rsplit('.').next().map(str::to_ascii_lowercase).unwrap_or_default();

	match extension.as_str() {
		"pdf" => "application/pdf",
		"png" => "image/png",
		"jpg" | "jpeg" => "image/jpeg",
		"tif" | "tiff" => "image/tiff",
		"gif" => "image/gif",
		"txt" => "text/plain",
		"htm" | "html" => "text/html",
		_ => "application/octet-stream",
	}
}
