use regex::Regex;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
	Mail,
	Fax,
}
impl MessageKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Mail => "mail",
			Self::Fax => "fax",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"mail" => Some(Self::Mail),
			"fax" => Some(Self::Fax),
			_ => None,
		}
	}
}

/// Provenance tag of the mirrored body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
	MailRaw,
	MailRendered,
	FaxOcr,
	FaxBasic,
}
impl BodyKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::MailRaw => "mail_raw",
			Self::MailRendered => "mail_rendered",
			Self::FaxOcr => "fax_ocr",
			Self::FaxBasic => "fax_basic",
		}
	}

	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"mail_raw" => Some(Self::MailRaw),
			"mail_rendered" => Some(Self::MailRendered),
			"fax_ocr" => Some(Self::FaxOcr),
			"fax_basic" => Some(Self::FaxBasic),
			_ => None,
		}
	}
}

/// Kind-specific message payload. Downstream code works with [`ResolvedBody`] and never
/// branches on the kind again.
#[derive(Debug, Clone)]
pub enum MessageContent {
	Mail { plain: String, html: String },
	Fax { ocr: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
	pub text: String,
	pub kind: BodyKind,
}

/// A captured message as handed over by the ingestion collaborators.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
	pub id: String,
	pub subject: String,
	pub sender: String,
	pub recipient: String,
	pub received_at: OffsetDateTime,
	pub snippet: String,
	pub content: MessageContent,
	pub attachment_paths: Vec<String>,
	pub primary_document_path: Option<String>,
	pub primary_document_thumbnail_path: Option<String>,
}
impl IncomingMessage {
	pub fn kind(&self) -> MessageKind {
		match self.content {
			MessageContent::Mail { .. } => MessageKind::Mail,
			MessageContent::Fax { .. } => MessageKind::Fax,
		}
	}

	/// Projects the body text exactly once. Mail prefers the plain part and falls back to the
	/// stripped HTML part; fax prefers OCR text and falls back to the snippet.
	pub fn resolved_body(&self) -> ResolvedBody {
		match &self.content {
			MessageContent::Mail { plain, html } =>
				if !plain.trim().is_empty() {
					ResolvedBody { text: plain.clone(), kind: BodyKind::MailRaw }
				} else {
					ResolvedBody { text: strip_html(html), kind: BodyKind::MailRendered }
				},
			MessageContent::Fax { ocr } => match ocr {
				Some(text) if !text.trim().is_empty() =>
					ResolvedBody { text: text.clone(), kind: BodyKind::FaxOcr },
				_ => ResolvedBody { text: self.snippet.clone(), kind: BodyKind::FaxBasic },
			},
		}
	}

	/// OCR text when present, regardless of whether the projection picked it.
	pub fn ocr_text(&self) -> Option<&str> {
		match &self.content {
			MessageContent::Fax { ocr } => ocr.as_deref(),
			MessageContent::Mail { .. } => None,
		}
	}
}

/// Makes alias text inside markup visible to the matcher. Tag removal plus the common
/// entities, not a sanitizer.
pub fn strip_html(html: &str) -> String {
	let without_blocks = Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>")
		.map(|re| re.replace_all(html, " ").into_owned())
		.unwrap_or_else(|_| html.to_string());
	let without_tags = Regex::new(r"<[^>]*>")
		.map(|re| re.replace_all(&without_blocks, " ").into_owned())
		.unwrap_or(without_blocks);
	let unescaped = without_tags
		.replace("&nbsp;", " ")
		.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&amp;", "&");

	unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
}
