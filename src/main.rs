use anyhow::Result;
use folio_core::{
    cli::assemble,
    config::Configure,
    domains,
    module::{compose, FeatureDescriptor, Provider},
    server::App,
    telemetry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let configure = Arc::new(Configure::load()?);

    let prometheus = telemetry::init(&configure.config().telemetry)?;

    info!("Starting Folio Core");

    let overrides = prometheus
        .map(|handle| FeatureDescriptor::new().provide(Provider::value("metrics.prometheus", handle)));
    let registrations = domains::default_registrations(&configure);
    let bootstrap = compose(
        &domains::registry(),
        configure.clone(),
        &registrations,
        overrides,
    )
    .await?;

    let entry = assemble(
        configure,
        Arc::new(bootstrap),
        Vec::new(),
        Some(Box::new(|app: &App, addr: SocketAddr| {
            let routes = app.restful().map(|r| r.describe().len()).unwrap_or(0);
            info!(routes, "Listening on http://{}", addr);
        })),
    )?;

    let code = entry.run(std::env::args_os()).await;
    std::process::exit(code)
}
