use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use bookrec_engine::catalog::Catalog;
use bookrec_engine::config::CliArgs;
use bookrec_engine::loader::load_artifacts;
use bookrec_engine::ratings::RatingStore;
use bookrec_engine::server::BookServer;
use bookrec_engine::transport::NdjsonTransport;

fn main() -> Result<()> {
	let args = CliArgs::parse();

	// Logs go to stderr; stdout carries the protocol
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	tracing::info!(data_dir = %args.data_dir.display(), "Loading catalog artifacts");
	let catalog = Arc::new(Catalog::from_artifacts(load_artifacts(&args.artifact_paths())));
	if !catalog.is_loaded() {
		tracing::warn!("Recommendation data incomplete; recommendations will be unavailable");
	}

	let ratings = RatingStore::open(args.ratings_path());

	let transport = NdjsonTransport::new();
	let mut server = BookServer::new(transport, catalog, ratings, args.server_config());

	tracing::info!("bookrec-engine ready");
	server.run()?;
	Ok(())
}
