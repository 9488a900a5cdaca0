use axiomrag::{api, config, logging, pipeline};
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();
    let app = api::create_router(Arc::new(pipeline::IngestService::new().await));

    let port = config::get_config().server_port.unwrap_or(DEFAULT_PORT);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.unwrap();
}
