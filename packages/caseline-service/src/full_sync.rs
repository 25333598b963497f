use std::time::Duration;

use tokio::time as tokio_time;
use uuid::Uuid;

use caseline_domain::{
	customer::{self, CustomerRef},
	management_no::ExplicitCodePattern,
	message::{IncomingMessage, MessageContent, MessageKind, strip_html},
};
use caseline_storage::{
	cases::{self, EnsureCaseArgs},
	counter, customers,
	messages::{self, UpsertMessageArgs},
};
use time::OffsetDateTime;

use crate::{CaseService, ServiceError, ServiceResult, case_title, first_chars};

#[derive(Debug)]
pub struct FullSyncResponse {
	pub case_id: Uuid,
	pub management_no: String,
	pub customer: Option<CustomerRef>,
}

impl CaseService {
	/// Full phase: settle the message's true identity and finalize the mirror. Every write
	/// is an upsert or a transactional full-set replace, so re-running converges on the
	/// same state, and running before the Basic phase is safe.
	pub async fn full_sync(&self, msg: &IncomingMessage) -> ServiceResult<FullSyncResponse> {
		let msg = self.resolve_collaborators(msg).await?;
		let existing = messages::fetch_message(&self.db, &msg.id).await?;
		let management_no = if let Some(row) = &existing
			&& row.sync_state == "full"
		{
			// Re-run of an already finalized message keeps its number stable.
			cases::fetch_case(&self.db, row.case_id)
				.await?
				.map(|case| case.management_no)
				.ok_or_else(|| ServiceError::Storage {
					message: format!("Case {} for message {} is missing.", row.case_id, msg.id),
				})?
		} else {
			self.determine_management_no(&msg).await?
		};

		cases::migrate_management_no(&self.db, &msg.id, &management_no).await?;

		let masters = customers::load_masters(&self.db).await?;
		let body = msg.resolved_body();
		let prefix = format!(
			"{}\n{}",
			msg.subject,
			first_chars(&body.text, self.cfg.sync.match_prefix_chars)
		);
		let customer = customer::match_customer(&masters, &prefix)
			.or_else(|| customer::match_customer(&masters, &full_candidate_text(&msg)));

		if customer.is_none() {
			tracing::debug!(message_id = %msg.id, "No customer alias matched.");
		}

		let case_id = cases::ensure_by_management_no(
			&self.db,
			EnsureCaseArgs {
				management_no: &management_no,
				customer_id: customer.as_ref().map(|c| c.id.as_str()),
				customer_name: customer.as_ref().map(|c| c.name.as_str()),
				title: case_title(&msg.subject, &msg.snippet),
				received_at: msg.received_at,
			},
		)
		.await?;
		let ocr_status = match (msg.kind(), msg.ocr_text()) {
			(MessageKind::Fax, Some(_)) => "done",
			(MessageKind::Fax, None) => "pending",
			(MessageKind::Mail, _) => "skipped",
		};

		messages::upsert_message_full(
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
				primary_document_path: msg.primary_document_path.as_deref(),
				source_document_path: msg.primary_document_path.as_deref(),
				ocr_status,
			},
		)
		.await?;
		messages::replace_attachments(&self.db, case_id, &msg.id, &msg.attachment_paths).await?;

		if let Some(path) = msg.primary_document_path.as_deref() {
			messages::replace_primary_document(
				&self.db,
				case_id,
				&msg.id,
				path,
				msg.primary_document_thumbnail_path.as_deref(),
				&file_type_of(path),
			)
			.await?;
		}

		messages::mark_processed(&self.db, &msg.id, OffsetDateTime::now_utc()).await?;

		tracing::info!(
			message_id = %msg.id,
			management_no = %management_no,
			case_id = %case_id,
			"Full sync complete."
		);

		Ok(FullSyncResponse { case_id, management_no, customer })
	}

	/// Fills in what the external collaborators own: OCR text for a fax, a rendered
	/// document for a mail without one. The OCR call carries an explicit deadline; on
	/// timeout the phase aborts and already committed Basic writes stand.
	async fn resolve_collaborators(
		&self,
		msg: &IncomingMessage,
	) -> ServiceResult<IncomingMessage> {
		let mut msg = msg.clone();

		match &mut msg.content {
			MessageContent::Fax { ocr } if ocr.is_none() => {
				let Some(document_path) = msg.primary_document_path.as_deref() else {
					return Err(ServiceError::InvalidRequest {
						message: format!("Fax {} has no stored document to recognize.", msg.id),
					});
				};
				let deadline = Duration::from_millis(self.cfg.sync.ocr_timeout_ms);
				let recognized = tokio_time::timeout(
					deadline,
					self.providers.ocr.recognize(&self.cfg.providers.ocr, document_path),
				)
				.await
				.map_err(|_| ServiceError::Provider {
					message: format!("OCR deadline of {deadline:?} exceeded."),
				})??;

				*ocr = Some(recognized);
			},
			MessageContent::Mail { html, .. }
				if msg.primary_document_path.is_none() && !html.trim().is_empty() =>
			{
				let rendered =
					self.providers.render.render(&self.cfg.providers.render, html).await?;

				msg.primary_document_path = Some(rendered.path);
				msg.primary_document_thumbnail_path = rendered.thumbnail_path;
			},
			_ => {},
		}

		Ok(msg)
	}

	/// An explicit code is reused only when some message already lives under it; otherwise
	/// the token is advisory and a fresh number is minted.
	async fn determine_management_no(&self, msg: &IncomingMessage) -> ServiceResult<String> {
		let pattern =
			ExplicitCodePattern::new(&self.cfg.management_no.label).map_err(|err| {
				ServiceError::InvalidRequest {
					message: format!("Management number label does not compile: {err}."),
				}
			})?;

		if let Some(code) = pattern.extract(&full_candidate_text(msg)) {
			if cases::management_no_in_use(&self.db, &code).await? {
				tracing::info!(message_id = %msg.id, code = %code, "Reusing explicit management number.");

				return Ok(code);
			}

			tracing::debug!(message_id = %msg.id, code = %code, "Explicit code is unknown. Allocating.");
		}

		Ok(counter::allocate(&self.db).await?)
	}
}

/// Subject plus every text the collaborators produced, for the fallback matching pass and
/// explicit-code extraction.
fn full_candidate_text(msg: &IncomingMessage) -> String {
	match &msg.content {
		MessageContent::Mail { plain, html } =>
			format!("{}\n{}\n{}", msg.subject, plain, strip_html(html)),
		MessageContent::Fax { ocr } =>
			format!("{}\n{}\n{}", msg.subject, msg.snippet, ocr.as_deref().unwrap_or_default()),
	}
}

fn file_type_of(path: &str) -> String {
	match path.rsplit_once('.') {
		Some((_, extension)) if !extension.is_empty() && !extension.contains('/') =>
			extension.to_ascii_lowercase(),
		_ => "pdf".to_string(),
	}
}
