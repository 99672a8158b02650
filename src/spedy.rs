use reqwest::{Client, StatusCode, Url, header::CONTENT_TYPE};

use crate::{config::InvoicingConfig, payload::InvoicePayload};

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, thiserror::Error)]
pub enum RemoteApiError {
    #[error("invoicing API answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("invoicing API unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RemoteApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RemoteApiError::Rejected { status, .. } => Some(*status),
            RemoteApiError::Transport(err) => err.status(),
        }
    }
}

/// Spedy service-invoice endpoint.
///
/// No timeout is set here; configure one on the [`Client`] passed in.
#[derive(Clone)]
pub struct InvoicingClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl InvoicingClient {
    pub fn new(http: Client, config: InvoicingConfig) -> Self {
        Self {
            http,
            endpoint: config.endpoint,
            api_key: config.api_key,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[tracing::instrument(skip_all, fields(integration_id = %payload.integration_id))]
    pub async fn issue(&self, payload: &InvoicePayload) -> Result<(), RemoteApiError> {
        let res = self
            .http
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = res.status();

        tracing::debug!(spedy_status = ?status);

        match status {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            _ => {
                let body = res.text().await.unwrap_or_else(|err| {
                    tracing::warn!(?err, "spedy_body_err");
                    String::new()
                });

                Err(RemoteApiError::Rejected { status, body })
            }
        }
    }
}
