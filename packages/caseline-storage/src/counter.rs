use caseline_domain::management_no;

use crate::{Error, Result, db::Db, models::CounterRow};

const MAX_ATTEMPTS: u32 = 3;

/// Mints the next management number. The whole read-modify-write runs in one transaction
/// with the singleton row locked, so concurrent allocators are linearized through it; a
/// serialization failure is retried here instead of surfacing to the caller.
pub async fn allocate(db: &Db) -> Result<String> {
	let mut attempt = 0;

	loop {
		attempt += 1;

		match try_allocate(db).await {
			Ok(code) => return Ok(code),
			Err(err) if attempt < MAX_ATTEMPTS && is_serialization_failure(&err) => continue,
			Err(err) => return Err(err),
		}
	}
}

async fn try_allocate(db: &Db) -> Result<String> {
	let mut tx = db.pool.begin().await?;
	let row: Option<CounterRow> =
		sqlx::query_as("SELECT value, width FROM management_counter WHERE singleton FOR UPDATE")
			.fetch_optional(&mut *tx)
			.await?;
	let Some(row) = row else {
		return Err(Error::NotFound("Management counter row is missing.".to_string()));
	};
	let (next, width) = management_no::advance(row.value, row.width as u32);

	sqlx::query("UPDATE management_counter SET value = $1, width = $2 WHERE singleton")
		.bind(next)
		.bind(width as i32)
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(management_no::render_code(next, width))
}

fn is_serialization_failure(err: &Error) -> bool {
	match err {
		Error::Sqlx(sqlx::Error::Database(db_err)) => db_err.code().as_deref() == Some("40001"),
		_ => false,
	}
}
