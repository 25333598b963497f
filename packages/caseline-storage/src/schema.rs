pub fn render_schema(counter_width: u32) -> String {
	let init = include_str!("../../../sql/init.sql");
	let expanded = expand_includes(init);

	expanded.replace("<COUNTER_WIDTH>", &counter_width.to_string())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_cases.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_cases.sql")),
				"tables/002_messages.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_messages.sql")),
				"tables/003_attachments.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_attachments.sql")),
				"tables/004_primary_documents.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_primary_documents.sql")),
				"tables/005_management_counter.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_management_counter.sql")),
				"tables/006_customers.sql" =>
					out.push_str(include_str!("../../../sql/tables/006_customers.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
