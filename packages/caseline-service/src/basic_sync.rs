use uuid::Uuid;

use caseline_domain::message::{IncomingMessage, MessageKind};
use caseline_storage::{
	cases::{self, EnsureCaseArgs},
	messages::{self, UpsertMessageArgs},
};

use crate::{CaseService, ServiceResult, case_title};

#[derive(Debug)]
pub struct BasicSyncResponse {
	pub case_id: Uuid,
	/// True when the message was already finalized and nothing was written.
	pub skipped: bool,
}

impl CaseService {
	/// Basic phase: make the message visible under a provisional case keyed by its own id,
	/// before OCR and identity resolution have run. Safe to call any number of times; once
	/// the Full phase has finalized the message this becomes a read-only no-op.
	pub async fn basic_sync(&self, msg: &IncomingMessage) -> ServiceResult<BasicSyncResponse> {
		if let Some(existing) = messages::fetch_message(&self.db, &msg.id).await?
			&& existing.sync_state == "full"
		{
			tracing::debug!(message_id = %msg.id, "Message already finalized. Skipping basic sync.");

			return Ok(BasicSyncResponse { case_id: existing.case_id, skipped: true });
		}

		let body = msg.resolved_body();
		let case_id = cases::ensure_by_management_no(
			&self.db,
			EnsureCaseArgs {
				management_no: &msg.id,
				customer_id: None,
				customer_name: None,
				title: case_title(&msg.subject, &msg.snippet),
				received_at: msg.received_at,
			},
		)
		.await?;
		let ocr_status = match msg.kind() {
			MessageKind::Fax => "pending",
			MessageKind::Mail => "skipped",
		};

		messages::upsert_message_basic(
			&self.db,
			UpsertMessageArgs {
				message_id: &msg.id,
				case_id,
				kind: msg.kind().as_str(),
				subject: &msg.subject,
				sender: &msg.sender,
				recipient: &msg.recipient,
				received_at: msg.received_at,
				snippet: &msg.snippet,
				body: &body.text,
				body_kind: body.kind.as_str(),
				primary_document_path: None,
				source_document_path: msg.primary_document_path.as_deref(),
				ocr_status,
			},
		)
		.await?;

		tracing::info!(message_id = %msg.id, case_id = %case_id, "Basic sync complete.");

		Ok(BasicSyncResponse { case_id, skipped: false })
	}
}
