use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = caseline_worker::Args::parse();

	caseline_worker::run(args).await
}
