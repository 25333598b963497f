use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct CaseRow {
	pub case_id: Uuid,
	pub management_no: String,
	pub customer_id: Option<String>,
	pub customer_name: Option<String>,
	pub title: String,
	pub latest_message_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct MessageRow {
	pub message_id: String,
	pub case_id: Uuid,
	pub kind: String,
	pub subject: String,
	pub sender: String,
	pub recipient: String,
	pub received_at: OffsetDateTime,
	pub snippet: String,
	pub body: String,
	pub body_kind: String,
	pub primary_document_path: Option<String>,
	pub source_document_path: Option<String>,
	pub sync_state: String,
	pub processed_at: Option<OffsetDateTime>,
	pub processing_at: Option<OffsetDateTime>,
	pub ocr_status: String,
	pub ocr_error: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct AttachmentRow {
	pub attachment_id: Uuid,
	pub case_id: Uuid,
	pub message_id: String,
	pub object_path: String,
	pub filename: String,
	pub mime: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct PrimaryDocumentRow {
	pub document_id: Uuid,
	pub case_id: Uuid,
	pub message_id: String,
	pub object_path: String,
	pub thumbnail_path: Option<String>,
	pub file_type: String,
	pub mime: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct CounterRow {
	pub value: i64,
	pub width: i32,
}

#[derive(Debug, sqlx::FromRow)]
pub struct CustomerRow {
	pub customer_id: String,
	pub name: String,
	pub mail_aliases: Vec<String>,
	pub fax_aliases: Vec<String>,
	pub name_aliases: Vec<String>,
	pub sort_order: i32,
}
