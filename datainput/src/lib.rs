pub mod config;
pub mod enricher;
pub mod errors;
mod http;
pub mod metrics_defs;
pub mod notifier;
pub mod parser;
pub mod pipeline;
pub mod record;
mod service;
pub mod storage;
pub mod trigger;

#[cfg(test)]
mod testutils;

use errors::DataInputError;
use pipeline::Pipeline;
use service::DataInputService;
use shared::admin_service::AdminService;
use shared::http::run_http_service;

pub async fn run(config: config::Config) -> Result<(), DataInputError> {
    config.validate()?;

    let pipeline = Pipeline::from_config(&config).await?;
    let service = DataInputService::new(pipeline, &config.ingest_path);
    let ingest_task = run_http_service(&config.listener.host, config.listener.port, service);

    match &config.admin_listener {
        Some(admin) => {
            // Nothing to warm up: ready as soon as the listener is bound
            let admin_service = AdminService::<_, DataInputError>::new(|| true);
            let admin_task = run_http_service(&admin.host, admin.port, admin_service);
            tokio::try_join!(ingest_task, admin_task)?;
        }
        None => ingest_task.await?,
    }

    Ok(())
}
