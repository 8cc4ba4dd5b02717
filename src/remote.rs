//! Remote processing collaborator: the network boundary behind submission.
//!
//! The service consumes a multipart form (`foreground` required, `background`
//! optional) and answers with base64-encoded images plus optional subject pose
//! metadata. Failures carry a `detail` string that becomes the user-visible
//! message; anything unparseable collapses to [`GENERIC_PROCESS_ERROR`].

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::encoded::EncodedImage;
use crate::error::{PicblendError, PicblendResult};
use crate::session::ResultBundle;

/// Fallback user-facing message when the service gives no usable detail.
pub const GENERIC_PROCESS_ERROR: &str = "Failed to process images. Please try again.";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Encoded bytes for one submission, handed out by
/// [`crate::Session::begin_submit`].
#[derive(Clone, Debug)]
pub struct SubmitRequest {
    pub foreground: Arc<Vec<u8>>,
    pub background: Option<Arc<Vec<u8>>>,
}

/// The seam between the orchestrator and whatever transport performs the
/// processing call. Submissions are not cancellable once issued.
pub trait ProcessService {
    fn process(
        &self,
        request: SubmitRequest,
    ) -> impl Future<Output = PicblendResult<ResultBundle>> + Send;
}

/// Success body of `POST /process-images`.
#[derive(Debug, serde::Deserialize)]
struct ProcessResponse {
    success: bool,
    car_only: String,
    #[serde(default)]
    final_image: Option<String>,
    #[serde(default)]
    car_angle: Option<f32>,
    #[serde(default)]
    car_orientation: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// HTTP implementation of [`ProcessService`] against the processing API.
pub struct HttpProcessService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProcessService {
    pub fn new(base_url: impl Into<String>) -> PicblendResult<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> PicblendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PicblendError::network(format!("build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/process-images", self.base_url)
    }

    fn map_transport_error(e: reqwest::Error) -> PicblendError {
        if e.is_timeout() {
            PicblendError::network(format!("processing request timed out: {e}"))
        } else if e.is_connect() {
            PicblendError::network(format!("cannot reach processing service: {e}"))
        } else {
            PicblendError::network(format!("processing request failed: {e}"))
        }
    }

    fn bundle_from_response(resp: ProcessResponse) -> PicblendResult<ResultBundle> {
        if !resp.success {
            return Err(PicblendError::server(GENERIC_PROCESS_ERROR));
        }

        Ok(ResultBundle {
            subject_only: EncodedImage::from_base64(&resp.car_only)?,
            final_composite: resp
                .final_image
                .as_deref()
                .map(EncodedImage::from_base64)
                .transpose()?,
            angle_degrees: resp.car_angle,
            orientation: resp.car_orientation,
        })
    }
}

impl ProcessService for HttpProcessService {
    async fn process(&self, request: SubmitRequest) -> PicblendResult<ResultBundle> {
        let mut form = reqwest::multipart::Form::new().part(
            "foreground",
            reqwest::multipart::Part::bytes(request.foreground.as_ref().clone())
                .file_name("foreground.png"),
        );

        if let Some(background) = &request.background {
            form = form.part(
                "background",
                reqwest::multipart::Part::bytes(background.as_ref().clone())
                    .file_name("background.png"),
            );
        }

        debug!(
            endpoint = %self.endpoint(),
            has_background = request.background.is_some(),
            "posting processing request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| GENERIC_PROCESS_ERROR.to_string());
            debug!(status = status.as_u16(), "processing request rejected");
            return Err(PicblendError::server(detail));
        }

        let parsed: ProcessResponse = response
            .json()
            .await
            .map_err(|e| PicblendError::server(format!("malformed processing response: {e}")))?;

        Self::bundle_from_response(parsed)
    }
}
