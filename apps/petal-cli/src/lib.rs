use std::path::PathBuf;

use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use petal_domain::intent::{ChatTurn, SearchCriteria};
use petal_service::{ChatRequest, PetalService, Providers};

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab", styles = styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Fetch the product feed and rebuild the catalog snapshot.
	Refresh,
	/// Run a ranked product search directly, bypassing intent classification.
	Search {
		query: String,
		#[arg(long, default_value_t = 0)]
		max_results: u32,
		#[arg(long)]
		product_type: Option<String>,
		#[arg(long = "attribute")]
		attributes: Vec<String>,
	},
	/// One full conversation turn: classify, search, reply.
	Chat {
		query: String,
		#[arg(long, default_value = "cli")]
		identifier: String,
		/// JSON file holding prior turns of {role, text}.
		#[arg(long, value_name = "FILE")]
		history: Option<PathBuf>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = petal_config::load(&args.config)?;

	init_tracing(&config)?;

	let service = PetalService::new(config, Providers::default())?;

	match args.command {
		Command::Refresh => {
			let count = service.refresh_catalog().await?;

			tracing::info!("Catalog snapshot rebuilt with {count} products.");
		},
		Command::Search { query, max_results, product_type, attributes } => {
			let criteria = SearchCriteria { product_type, attributes };
			let outcome = service.search(&query, max_results, &criteria).await?;

			println!("{}", serde_json::to_string_pretty(&outcome.products)?);
		},
		Command::Chat { query, identifier, history } => {
			let history = match history {
				Some(path) => load_history(&path)?,
				None => Vec::new(),
			};
			let request = ChatRequest { query, identifier, history };
			let response = service.chat(&request).await?;

			println!("{}", serde_json::to_string_pretty(&response)?);
		},
	}

	Ok(())
}

fn load_history(path: &PathBuf) -> color_eyre::Result<Vec<ChatTurn>> {
	let raw = std::fs::read_to_string(path)
		.map_err(|err| eyre::eyre!("Failed to read history file {}: {err}.", path.display()))?;

	serde_json::from_str(&raw)
		.map_err(|err| eyre::eyre!("Failed to parse history file {}: {err}.", path.display()))
}

fn init_tracing(config: &petal_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	Ok(())
}
