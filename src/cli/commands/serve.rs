use tracing::info;

use crate::config::AppConfig;

pub async fn handle(mut config: AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.api.port = port;
    }

    info!("Starting Jobly API in {:?} mode", config.environment);
    crate::server::serve(config).await
}
