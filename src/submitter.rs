use crate::{
    data::TransactionRecord,
    db::{StoreError, TransactionStore},
    payload::InvoicePayload,
    spedy::{InvoicingClient, RemoteApiError},
};

/// Outcome of one emission attempt that got past the store.
#[derive(Debug)]
pub enum Emission {
    /// No approved transaction matches the reference. Nothing was sent.
    NotFound,
    Issued(TransactionRecord),
    Rejected {
        record: TransactionRecord,
        error: RemoteApiError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("store access failed: {0}")]
    Store(#[from] StoreError),
}

/// Lookup, build, send, log. One reference at a time, no retries.
pub struct InvoiceSubmitter<S> {
    store: S,
    client: InvoicingClient,
}

impl<S: TransactionStore> InvoiceSubmitter<S> {
    pub fn new(store: S, client: InvoicingClient) -> Self {
        Self { store, client }
    }

    /// Emits the invoice for `reference` and returns the transaction it was
    /// built from.
    ///
    /// Returns `None` when no approved transaction matches or the store could
    /// not be read. A failed POST is logged but still yields the record:
    /// callers that need to know use [`InvoiceSubmitter::emit`].
    pub async fn submit(&self, reference: &str) -> Option<TransactionRecord> {
        match self.emit(reference).await {
            Ok(Emission::NotFound) => {
                tracing::warn!(reference, "invoice_not_found");
                None
            }
            Ok(Emission::Issued(record)) => {
                tracing::info!(reference, id = record.id, "invoice_issued");
                Some(record)
            }
            Ok(Emission::Rejected { record, error }) => {
                match &error {
                    RemoteApiError::Rejected { status, body } => {
                        tracing::error!(reference, id = record.id, %status, body = %body, "invoice_rejected");
                    }
                    RemoteApiError::Transport(err) => {
                        tracing::error!(reference, id = record.id, ?err, "invoice_send_err");
                    }
                }
                Some(record)
            }
            Err(err) => {
                tracing::error!(reference, %err, "store_err");
                None
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn emit(&self, reference: &str) -> Result<Emission, SubmitError> {
        let Some(record) = self.store.find_approved(reference)? else {
            return Ok(Emission::NotFound);
        };

        let payload = InvoicePayload::from_record(&record);

        let emission = match self.client.issue(&payload).await {
            Ok(()) => Emission::Issued(record),
            Err(error) => Emission::Rejected { record, error },
        };

        Ok(emission)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::{Ipv4Addr, SocketAddr},
        sync::{Arc, Mutex},
    };

    use axum::{Router, http::HeaderMap, routing};
    use reqwest::{Client, StatusCode, Url};
    use serde_json::Value;

    use super::*;
    use crate::{config::InvoicingConfig, data::sample_record};

    const PATH: &str = "/v1/service-invoices";

    struct MemoryStore(Vec<(&'static str, TransactionRecord)>);

    impl TransactionStore for MemoryStore {
        fn find_approved(&self, reference: &str) -> Result<Option<TransactionRecord>, StoreError> {
            Ok(self
                .0
                .iter()
                .find(|(r, record)| *r == reference && record.is_approved())
                .map(|(_, record)| record.clone()))
        }
    }

    struct BrokenStore;

    impl TransactionStore for BrokenStore {
        fn find_approved(&self, _: &str) -> Result<Option<TransactionRecord>, StoreError> {
            Err(StoreError::Query(rusqlite::Error::InvalidQuery))
        }
    }

    #[derive(Clone, Default)]
    struct Received(Arc<Mutex<Vec<(HeaderMap, String)>>>);

    impl Received {
        fn take(&self) -> Vec<(HeaderMap, String)> {
            std::mem::take(&mut *self.0.lock().expect("lock"))
        }
    }

    /// Stand-in for Spedy answering every POST with `status` and `body`.
    async fn fake_spedy(status: StatusCode, body: &'static str) -> (Url, Received) {
        let received = Received::default();
        let sink = received.clone();

        let app = Router::new().route(
            PATH,
            routing::post(move |headers: HeaderMap, payload: String| {
                let sink = sink.clone();
                async move {
                    sink.0.lock().expect("lock").push((headers, payload));
                    (status, body)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move { axum::serve(listener, app).await });

        (endpoint(addr), received)
    }

    fn endpoint(addr: SocketAddr) -> Url {
        Url::parse(&format!("http://{addr}{PATH}")).expect("endpoint url")
    }

    fn submitter<S: TransactionStore>(store: S, endpoint: Url) -> InvoiceSubmitter<S> {
        let config = InvoicingConfig {
            endpoint,
            api_key: "test-key".to_string(),
        };

        InvoiceSubmitter::new(store, InvoicingClient::new(Client::new(), config))
    }

    /// Formatted log lines written while the returned guard is alive.
    #[derive(Clone, Default)]
    struct Logs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Logs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Logs {
        fn capture() -> (Self, tracing::subscriber::DefaultGuard) {
            let logs = Logs::default();
            let writer = logs.clone();

            let subscriber = tracing_subscriber::fmt()
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();

            (logs, tracing::subscriber::set_default(subscriber))
        }

        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("lock")).into_owned()
        }
    }

    fn store_with_tx123() -> MemoryStore {
        MemoryStore(vec![("TX123", sample_record())])
    }

    #[tokio::test]
    async fn issues_invoice_for_approved_transaction() {
        let (url, received) = fake_spedy(StatusCode::CREATED, r#"{"id":"abc"}"#).await;

        let record = submitter(store_with_tx123(), url).submit("TX123").await;

        assert_eq!(record, Some(sample_record()));

        let mut requests = received.take();
        assert_eq!(requests.len(), 1);

        let (headers, body) = requests.remove(0);
        assert_eq!(headers["x-api-key"], "test-key");
        assert_eq!(headers["content-type"], "application/json");

        let payload: Value = serde_json::from_str(&body).expect("json body");
        assert_eq!(payload["total"]["invoiceAmount"], 150.5);
        assert_eq!(payload["receiver"]["name"], "Ana Silva");
        assert_eq!(payload["integrationId"], "42");
    }

    #[tokio::test]
    async fn ok_status_counts_as_issued() {
        let (url, _) = fake_spedy(StatusCode::OK, "").await;

        let emission = submitter(store_with_tx123(), url)
            .emit("TX123")
            .await
            .expect("emit");

        assert!(matches!(emission, Emission::Issued(r) if r.id == 42));
    }

    #[tokio::test]
    async fn unknown_reference_sends_nothing() {
        let (url, received) = fake_spedy(StatusCode::CREATED, "").await;
        let submitter = submitter(store_with_tx123(), url);
        let (logs, _guard) = Logs::capture();

        assert_eq!(submitter.submit("TX999").await, None);

        let logged = logs.contents();
        assert!(logged.contains("invoice_not_found"), "{logged}");
        assert!(logged.contains("TX999"), "{logged}");
        assert!(matches!(
            submitter.emit("TX999").await,
            Ok(Emission::NotFound)
        ));
        assert!(received.take().is_empty());
    }

    #[tokio::test]
    async fn unapproved_transaction_sends_nothing() {
        let (url, received) = fake_spedy(StatusCode::CREATED, "").await;
        let pending = TransactionRecord {
            status: "Pendente".to_string(),
            ..sample_record()
        };

        let record = submitter(MemoryStore(vec![("TX123", pending)]), url)
            .submit("TX123")
            .await;

        assert_eq!(record, None);
        assert!(received.take().is_empty());
    }

    #[tokio::test]
    async fn rejected_invoice_still_returns_record() {
        let (url, received) = fake_spedy(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let submitter = submitter(store_with_tx123(), url);
        let (logs, _guard) = Logs::capture();

        assert_eq!(submitter.submit("TX123").await, Some(sample_record()));

        let logged = logs.contents();
        assert!(logged.contains("invoice_rejected"), "{logged}");
        assert!(logged.contains("500"), "{logged}");
        assert!(logged.contains("boom"), "{logged}");

        match submitter.emit("TX123").await.expect("emit") {
            Emission::Rejected { record, error } => {
                assert_eq!(record.id, 42);
                assert_eq!(error.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
                assert!(
                    matches!(&error, RemoteApiError::Rejected { body, .. } if body == "boom"),
                    "{error}"
                );
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        assert_eq!(received.take().len(), 2);
    }

    #[tokio::test]
    async fn unreachable_api_still_returns_record() {
        let addr = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .and_then(|listener| listener.local_addr())
            .expect("free port");
        let submitter = submitter(store_with_tx123(), endpoint(addr));

        assert_eq!(submitter.submit("TX123").await, Some(sample_record()));
        assert!(matches!(
            submitter.emit("TX123").await,
            Ok(Emission::Rejected {
                error: RemoteApiError::Transport(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn store_failure_yields_nothing() {
        let (url, received) = fake_spedy(StatusCode::CREATED, "").await;
        let submitter = submitter(BrokenStore, url);
        let (logs, _guard) = Logs::capture();

        assert_eq!(submitter.submit("TX123").await, None);
        assert!(logs.contents().contains("store_err"));
        assert!(matches!(
            submitter.emit("TX123").await,
            Err(SubmitError::Store(_))
        ));
        assert!(received.take().is_empty());
    }
}
