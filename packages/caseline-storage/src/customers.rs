use caseline_domain::customer::CustomerMaster;

use crate::{Result, db::Db, models::CustomerRow};

/// Loads the customer master list in matching order. `sort_order` then id keeps the
/// first-hit-wins scan deterministic.
pub async fn load_masters(db: &Db) -> Result<Vec<CustomerMaster>> {
	let rows = sqlx::query_as::<_, CustomerRow>(
		"\
SELECT customer_id, name, mail_aliases, fax_aliases, name_aliases, sort_order
FROM customers
ORDER BY sort_order ASC, customer_id ASC",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows
		.into_iter()
		.map(|row| CustomerMaster {
			id: row.customer_id,
			name: row.name,
			mail_aliases: row.mail_aliases,
			fax_aliases: row.fax_aliases,
			name_aliases: row.name_aliases,
		})
		.collect())
}
