use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, db::Db, models::CaseRow};

pub struct EnsureCaseArgs<'a> {
	pub management_no: &'a str,
	pub customer_id: Option<&'a str>,
	pub customer_name: Option<&'a str>,
	pub title: &'a str,
	pub received_at: OffsetDateTime,
}

/// Inserts or updates the case row for a management number and returns its id. The UNIQUE
/// constraint on `management_no` plus the conflict clause make concurrent first references
/// converge on one row; the later call's customer and title win.
pub async fn ensure_by_management_no(db: &Db, args: EnsureCaseArgs<'_>) -> Result<Uuid> {
	let now = OffsetDateTime::now_utc();
	let case_id: Uuid = sqlx::query_scalar(
		"\
INSERT INTO cases (
	case_id,
	management_no,
	customer_id,
	customer_name,
	title,
	latest_message_at,
	created_at,
	updated_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
ON CONFLICT (management_no) DO UPDATE
SET
	customer_id = EXCLUDED.customer_id,
	customer_name = EXCLUDED.customer_name,
	title = EXCLUDED.title,
	latest_message_at = EXCLUDED.latest_message_at,
	updated_at = EXCLUDED.updated_at
RETURNING case_id",
	)
	.bind(Uuid::new_v4())
	.bind(args.management_no)
	.bind(args.customer_id)
	.bind(args.customer_name)
	.bind(args.title)
	.bind(args.received_at)
	.bind(now)
	.fetch_one(&db.pool)
	.await?;

	Ok(case_id)
}

/// Promotes a provisional case to its final key. A no-op when the keys are equal, when
/// nothing exists under the old key, or when the new key is already taken — cases are never
/// merged, the provisional row just stays under its old key.
pub async fn migrate_management_no(db: &Db, old_key: &str, new_key: &str) -> Result<()> {
	if old_key == new_key {
		return Ok(());
	}

	let result = sqlx::query(
		"\
UPDATE cases
SET management_no = $2, updated_at = $3
WHERE management_no = $1
	AND NOT EXISTS (SELECT 1 FROM cases WHERE management_no = $2)",
	)
	.bind(old_key)
	.bind(new_key)
	.bind(OffsetDateTime::now_utc())
	.execute(&db.pool)
	.await;

	match result {
		Ok(_) => Ok(()),
		// A concurrent insert of the new key between the guard and the update surfaces as a
		// unique violation; same collision, same benign outcome.
		Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(()),
		Err(err) => Err(Error::Sqlx(err)),
	}
}

pub async fn find_case_id(db: &Db, management_no: &str) -> Result<Option<Uuid>> {
	let case_id =
		sqlx::query_scalar("SELECT case_id FROM cases WHERE management_no = $1")
			.bind(management_no)
			.fetch_optional(&db.pool)
			.await?;

	Ok(case_id)
}

pub async fn fetch_case(db: &Db, case_id: Uuid) -> Result<Option<CaseRow>> {
	let row = sqlx::query_as::<_, CaseRow>("SELECT * FROM cases WHERE case_id = $1")
		.bind(case_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(row)
}

/// Point lookup backing explicit-code reuse: an extracted code is only honored when some
/// message already lives under it.
pub async fn management_no_in_use(db: &Db, management_no: &str) -> Result<bool> {
	let in_use: bool = sqlx::query_scalar(
		"\
SELECT EXISTS (
	SELECT 1
	FROM messages m
	JOIN cases c ON c.case_id = m.case_id
	WHERE c.management_no = $1
)",
	)
	.bind(management_no)
	.fetch_one(&db.pool)
	.await?;

	Ok(in_use)
}
