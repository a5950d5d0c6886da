//! Party queue server binary.

// crates.io
use color_eyre::eyre::Result;
use tokio::net::TcpListener;
// self
use party_queue::{config::Config, flows::Host, obs, renewal, server};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	obs::install_subscriber();

	let config = Config::from_env()?;
	let host = Host::from_config(&config)?;
	let renewal = renewal::spawn_renewal(host.clone(), config.renew_period);
	let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;

	tracing::info!(port = config.port, "Visit /login once to connect the host account.");

	server::serve(host, listener).await?;
	renewal.abort();

	Ok(())
}
