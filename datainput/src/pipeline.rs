use crate::config::Config;
use crate::enricher;
use crate::errors::{DataInputError, PipelineError};
use crate::metrics_defs::{PIPELINE_ERRORS, RECORDS_STORED};
use crate::notifier::{NotificationEvent, Notifier, WirePusherNotifier, dispatch_best_effort};
use crate::parser;
use crate::record::RecordKey;
use crate::storage::{self, RecordStore};
use crate::trigger::{DownstreamTrigger, HttpDownstreamTrigger};
use chrono::Local;
use hyper::StatusCode;
use shared::counter;
use std::error::Error as _;
use std::sync::Arc;

/// Format of the completion time in success notifications
const COMPLETION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Status and body returned to the caller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineResponse {
    pub status: StatusCode,
    pub body: String,
}

impl PipelineResponse {
    fn success() -> Self {
        PipelineResponse {
            status: StatusCode::OK,
            body: "Success".into(),
        }
    }
}

impl From<&PipelineError> for PipelineResponse {
    fn from(e: &PipelineError) -> Self {
        PipelineResponse {
            status: e.status_code(),
            body: e.to_string(),
        }
    }
}

/// Parse, enrich, store, trigger, notify.
///
/// Holds no mutable state, so one instance is shared by every request.
#[derive(Clone)]
pub struct Pipeline {
    store: Arc<dyn RecordStore>,
    trigger: Arc<dyn DownstreamTrigger>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        trigger: Arc<dyn DownstreamTrigger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Pipeline {
            store,
            trigger,
            notifier,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, DataInputError> {
        let client = reqwest::Client::builder().build()?;

        let store = storage::get_store(&config.storage, client.clone()).await?;
        let trigger = HttpDownstreamTrigger::new(&config.downstream, client.clone())?;
        let notifier = WirePusherNotifier::new(&config.notifier, client);

        Ok(Pipeline::new(store, Arc::new(trigger), Arc::new(notifier)))
    }

    /// Runs one request body through every stage and reports the outcome.
    ///
    /// Exactly one notification is attempted unless the body is rejected as
    /// invalid input.
    pub async fn handle(&self, body: &[u8]) -> PipelineResponse {
        match self.run(body).await {
            Ok(key) => {
                tracing::info!(
                    partition = %key.partition,
                    row = %key.row,
                    "Record ingested"
                );
                let event = NotificationEvent::success(format!(
                    "Record added at: {}",
                    Local::now().format(COMPLETION_TIME_FORMAT)
                ));
                dispatch_best_effort(self.notifier.as_ref(), &event).await;
                PipelineResponse::success()
            }
            Err(e) => self.fail(e).await,
        }
    }

    /// Logs, counts and, for operational errors, notifies a failed run.
    /// Also used for bodies that could not be read off the connection.
    pub async fn fail(&self, e: PipelineError) -> PipelineResponse {
        counter!(PIPELINE_ERRORS, "kind" => e.kind()).increment(1);

        if e.is_operational() {
            tracing::error!(kind = e.kind(), error = %e, cause = %cause(&e), "Request failed");
            dispatch_best_effort(self.notifier.as_ref(), &NotificationEvent::error(e.to_string()))
                .await;
        } else {
            tracing::info!(error = %e, cause = %cause(&e), "Request rejected");
        }

        PipelineResponse::from(&e)
    }

    async fn run(&self, body: &[u8]) -> Result<RecordKey, PipelineError> {
        let record = parser::parse_record(body)?;
        let enriched = enricher::enrich(record)?;

        storage::write_record(self.store.as_ref(), &enriched).await?;
        counter!(RECORDS_STORED).increment(1);

        // The record stays stored even if this fails
        self.trigger
            .trigger()
            .await
            .map_err(PipelineError::DownstreamTrigger)?;

        Ok(enriched.key())
    }
}

fn cause(e: &PipelineError) -> String {
    let mut chain = Vec::new();
    let mut source = e.source();
    while let Some(s) = source {
        chain.push(s.to_string());
        source = s.source();
    }
    chain.join(": ")
}
