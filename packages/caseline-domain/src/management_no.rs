use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Widths the counter and explicit code tokens may use. 16^12 still fits an i64.
pub const MIN_CODE_WIDTH: u32 = 4;
pub const MAX_CODE_WIDTH: u32 = 12;

/// Codes a width can hold. The counter value stays strictly below this.
pub fn capacity(width: u32) -> i64 {
	16_i64.checked_pow(width).unwrap_or(i64::MAX)
}

/// Monotonic-width counter step. When the current width is exhausted the width grows by one
/// and the value restarts at 1, so no code is ever reused across the counter's lifetime.
pub fn advance(value: i64, width: u32) -> (i64, u32) {
	let next = value + 1;

	if next >= capacity(width) { (1, width + 1) } else { (next, width) }
}

/// Uppercase hexadecimal, zero-padded to the counter width.
pub fn render_code(value: i64, width: u32) -> String {
	format!("{value:0>width$X}", width = width as usize)
}

pub fn decode_code(code: &str) -> Option<i64> {
	i64::from_str_radix(code, 16).ok()
}

/// Compiled matcher for a pre-assigned code carried in message text as a labeled token,
/// e.g. `Case No.: A00123`. Label and text are NFKC-normalized so full-width variants
/// match.
#[derive(Debug)]
pub struct ExplicitCodePattern {
	regex: Regex,
}
impl ExplicitCodePattern {
	pub fn new(label: &str) -> Result<Self, regex::Error> {
		let normalized_label: String = label.nfkc().collect();
		let pattern = format!(
			r"(?i){}\s*[:#]?\s*([0-9A-F]{{{MIN_CODE_WIDTH},{MAX_CODE_WIDTH}}})\b",
			regex::escape(&normalized_label)
		);
		let regex = Regex::new(&pattern)?;

		Ok(Self { regex })
	}

	pub fn extract(&self, text: &str) -> Option<String> {
		let normalized: String = text.nfkc().collect();

		self.regex
			.captures(&normalized)
			.and_then(|caps| caps.get(1))
			.map(|code| code.as_str().to_uppercase())
	}
}
