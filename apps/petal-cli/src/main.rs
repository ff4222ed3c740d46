use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = petal_cli::Args::parse();
	petal_cli::run(args).await
}
