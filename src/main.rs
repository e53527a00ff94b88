mod handlers;
mod models;
mod providers;
mod routes;
mod utils;
use axum::serve;
use std::error::Error;
use tokio::net::TcpListener;
use tracing::info;
use utils::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    routes::init_tracing();

    let config = Config::init();
    let app = routes::make_app(&config)?;

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    serve(listener, app).await?;
    Ok(())
}
