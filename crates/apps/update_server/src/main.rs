use tracing::info;
use tracing_subscriber::EnvFilter;
use update_server::{cycle_router, ServerSettings};

use kml_update::CycleHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = ServerSettings::from_env()?;
    let addr = settings.addr;
    let route = settings.route.clone();
    let handler = CycleHandler::new(settings.cycle)?;
    let app = cycle_router(&route, handler);

    info!("update server listening on http://{addr}{route}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
