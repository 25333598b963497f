use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod worker;

#[derive(Debug, Parser)]
#[command(
	version,
	rename_all = "kebab",
	styles = caseline_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: std::path::PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = caseline_config::load(&args.config)?;
	let filter = EnvFilter::new(config.service.log_level.clone());
	tracing_subscriber::fmt().with_env_filter(filter).init();

	let db = caseline_storage::db::Db::connect(&config.storage.postgres).await?;

	db.ensure_schema(config.management_no.initial_width).await?;

	let service = caseline_service::CaseService::new(config, db);

	worker::run_worker(service).await
}
