use crate::errors::OutboundError;
use reqwest::{RequestBuilder, Response};

/// Sends an outbound request, treating any non-2xx status as a failure.
///
/// No retries and no timeout beyond the client's own defaults.
pub async fn send_checked(request: RequestBuilder) -> Result<Response, OutboundError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(OutboundError::UnexpectedStatus(status));
    }

    Ok(response)
}
