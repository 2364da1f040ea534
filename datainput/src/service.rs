use crate::errors::{DataInputError, InvalidInputError, PipelineError};
use crate::metrics_defs::REQUEST_DURATION;
use crate::pipeline::{Pipeline, PipelineResponse};
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::{Body, Bytes, Incoming};
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use shared::histogram;
use shared::http::{make_boxed_error_response, make_text_response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

pub type ServiceBody = BoxBody<Bytes, DataInputError>;

/// Serves the single ingest endpoint
pub struct DataInputService {
    pipeline: Pipeline,
    ingest_path: Arc<str>,
}

impl DataInputService {
    pub fn new(pipeline: Pipeline, ingest_path: &str) -> Self {
        Self {
            pipeline,
            ingest_path: ingest_path.into(),
        }
    }
}

impl Service<Request<Incoming>> for DataInputService {
    type Response = Response<ServiceBody>;
    type Error = DataInputError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let pipeline = self.pipeline.clone();
        let ingest_path = self.ingest_path.clone();

        Box::pin(async move {
            let start = Instant::now();
            let response = handle_request(&pipeline, &ingest_path, req).await;

            histogram!(REQUEST_DURATION, "status" => response.status().as_str().to_owned())
                .record(start.elapsed().as_secs_f64());
            Ok(response)
        })
    }
}

async fn handle_request<B>(
    pipeline: &Pipeline,
    ingest_path: &str,
    req: Request<B>,
) -> Response<ServiceBody>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    if req.uri().path() != ingest_path {
        tracing::debug!(path = %req.uri().path(), "Unknown path");
        return make_boxed_error_response(StatusCode::NOT_FOUND);
    }

    if req.method() != Method::POST {
        return make_boxed_error_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    let outcome = match req.into_body().collect().await {
        Ok(collected) => pipeline.handle(&collected.to_bytes()).await,
        Err(e) => {
            let e = PipelineError::from(InvalidInputError::Unreadable(e.to_string()));
            pipeline.fail(e).await
        }
    };

    into_response(outcome)
}

fn into_response(outcome: PipelineResponse) -> Response<ServiceBody> {
    make_text_response(outcome.status, outcome.body)
}
