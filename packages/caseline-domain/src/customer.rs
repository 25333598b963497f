use unicode_normalization::UnicodeNormalization;

/// One record of the read-only customer master list. Alias classes are matched in a fixed
/// tier order, see [`match_customer`].
#[derive(Debug, Clone)]
pub struct CustomerMaster {
	pub id: String,
	pub name: String,
	pub mail_aliases: Vec<String>,
	pub fax_aliases: Vec<String>,
	pub name_aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CustomerRef {
	pub id: String,
	pub name: String,
}

/// NFKC, lowercase, all whitespace stripped. Fax OCR output mixes full-width and
/// half-width forms, so both sides of a comparison go through this.
pub fn norm_text(text: &str) -> String {
	text.nfkc().flat_map(char::to_lowercase).filter(|c| !c.is_whitespace()).collect()
}

/// NFKC, ASCII digits only. Phone numbers match regardless of punctuation and spacing.
pub fn norm_digits(text: &str) -> String {
	text.nfkc().filter(char::is_ascii_digit).collect()
}

/// Tiered first-hit matching: (1) mail aliases, (2) fax aliases, (3) name aliases. Each
/// tier scans the whole master list in order, alias order within a record, so a mail-alias
/// hit on a later record beats a name-alias hit on an earlier one. No match is `None`, not
/// an error.
pub fn match_customer(masters: &[CustomerMaster], text: &str) -> Option<CustomerRef> {
	let hay_text = norm_text(text);
	let hay_digits = norm_digits(text);

	for master in masters {
		if alias_hit(&master.mail_aliases, &hay_text, norm_text) {
			return Some(CustomerRef { id: master.id.clone(), name: master.name.clone() });
		}
	}
	for master in masters {
		if alias_hit(&master.fax_aliases, &hay_digits, norm_digits) {
			return Some(CustomerRef { id: master.id.clone(), name: master.name.clone() });
		}
	}
	for master in masters {
		if alias_hit(&master.name_aliases, &hay_text, norm_text) {
			return Some(CustomerRef { id: master.id.clone(), name: master.name.clone() });
		}
	}

	None
}

fn alias_hit(aliases: &[String], haystack: &str, norm: fn(&str) -> String) -> bool {
	aliases.iter().any(|alias| {
		let needle = norm(alias);

		!needle.is_empty() && haystack.contains(&needle)
	})
}
