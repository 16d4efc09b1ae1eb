use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error};

use crate::domain::entities::record::DeviceRecord;
use crate::domain::entities::snapshot::HostSnapshot;
use crate::domain::ports::publisher::{PublishError, RecordPublisher};

/// HTTP status the index returns for a freshly created document.
const STATUS_CREATED: u16 = 201;

/// Publishes records as document-creation requests to an
/// Elasticsearch-style telemetry index.
///
/// Delivery is best-effort: a non-created response or a transport error is
/// logged and swallowed so that a sick index never blocks collection.
pub struct ElasticsearchPublisher {
    endpoint: String,
    disk_index: String,
    system_index: String,
    client: reqwest::Client,
}

impl ElasticsearchPublisher {
    /// Builds a publisher with a bounded-timeout HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::ClientUnavailable` if the HTTP client cannot
    /// be initialized (e.g. TLS backend failure).
    pub fn new(
        endpoint: &str,
        disk_index: String,
        system_index: String,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PublishError::ClientUnavailable(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            disk_index,
            system_index,
            client,
        })
    }

    fn doc_url(&self, index: &str) -> String {
        format!("{}/{}/_doc", self.endpoint, index)
    }

    /// Posts a JSON document. Best-effort: errors are logged and swallowed
    /// (no retry, per the index contract).
    fn post_doc(&self, url: &str, document: &Value) {
        let result = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current()
                .block_on(self.client.post(url).json(document).send())
        });

        match result {
            Ok(resp) if resp.status().as_u16() == STATUS_CREATED => {
                debug!("document created at {url}");
            }
            Ok(resp) => error!("telemetry index rejected document: HTTP {}", resp.status()),
            Err(e) => error!("failed to reach telemetry index: {e}"),
        }
    }
}

impl RecordPublisher for ElasticsearchPublisher {
    fn publish_device(&self, record: &DeviceRecord) -> Result<(), PublishError> {
        let document = serde_json::to_value(record)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;
        self.post_doc(&self.doc_url(&self.disk_index), &document);
        Ok(())
    }

    fn publish_host(&self, snapshot: &HostSnapshot) -> Result<(), PublishError> {
        let document = serde_json::to_value(snapshot)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;
        self.post_doc(&self.doc_url(&self.system_index), &document);
        Ok(())
    }
}
