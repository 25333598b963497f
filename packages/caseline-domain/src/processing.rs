use time::{Duration, OffsetDateTime};

/// Explicit form of the state the store keeps in nullable timestamp columns
/// (`processed_at`, `processing_at`, `ocr_status`, `ocr_error`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingState {
	Unsynced,
	Leased { since: OffsetDateTime },
	Done { at: OffsetDateTime },
	Error { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
	AlreadyDone,
	NotLeased,
}

impl ProcessingState {
	pub fn from_columns(
		processed_at: Option<OffsetDateTime>,
		processing_at: Option<OffsetDateTime>,
		ocr_error: Option<&str>,
	) -> Self {
		if let Some(at) = processed_at {
			return Self::Done { at };
		}
		if let Some(since) = processing_at {
			return Self::Leased { since };
		}
		if let Some(message) = ocr_error {
			return Self::Error { message: message.to_string() };
		}

		Self::Unsynced
	}

	/// The lease-expiry rule. Errored rows stay eligible; `processed_at` is terminal.
	pub fn claimable(&self, now: OffsetDateTime, lock_window: Duration) -> bool {
		match self {
			Self::Unsynced | Self::Error { .. } => true,
			Self::Leased { since } => now - *since >= lock_window,
			Self::Done { .. } => false,
		}
	}

	pub fn claim(
		&self,
		now: OffsetDateTime,
		lock_window: Duration,
	) -> Result<Self, TransitionError> {
		if matches!(self, Self::Done { .. }) {
			return Err(TransitionError::AlreadyDone);
		}
		if !self.claimable(now, lock_window) {
			return Err(TransitionError::NotLeased);
		}

		Ok(Self::Leased { since: now })
	}

	pub fn complete(&self, now: OffsetDateTime) -> Result<Self, TransitionError> {
		match self {
			Self::Leased { .. } => Ok(Self::Done { at: now }),
			Self::Done { .. } => Err(TransitionError::AlreadyDone),
			_ => Err(TransitionError::NotLeased),
		}
	}

	pub fn fail(&self, message: &str) -> Result<Self, TransitionError> {
		match self {
			Self::Leased { .. } => Ok(Self::Error { message: message.to_string() }),
			Self::Done { .. } => Err(TransitionError::AlreadyDone),
			_ => Err(TransitionError::NotLeased),
		}
	}
}
