use crate::error::DashboardError;
use crate::models::Record;
use crate::query::{SoqlQuery, DEFAULT_RECORD_LIMIT};
use crate::source::RecordSource;

use async_trait::async_trait;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&SoqlQuery) -> Result<Vec<Record>, DashboardError> + Send + Sync>;

/// A RecordSource that answers queries with a closure and remembers the queries it was sent.
pub(crate) struct StubSource {
    responder: Responder,
    queries: Mutex<Vec<SoqlQuery>>,
}

impl StubSource {
    /// Create a StubSource answering every query with `responder`.
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&SoqlQuery) -> Result<Vec<Record>, DashboardError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            queries: Mutex::new(vec![]),
        }
    }

    /// Returns the queries received so far.
    pub(crate) fn queries(&self) -> Vec<SoqlQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSource for StubSource {
    fn record_limit(&self) -> usize {
        DEFAULT_RECORD_LIMIT
    }

    async fn fetch(&self, query: &SoqlQuery) -> Result<Vec<Record>, DashboardError> {
        self.queries.lock().unwrap().push(query.clone());
        (self.responder)(query)
    }
}

/// Create a Record with string fields.
pub(crate) fn record(fields: &[(&str, &str)]) -> Record {
    fields.iter().map(|(k, v)| (*k, *v)).collect()
}

/// An upstream error for failing stubs.
pub(crate) fn upstream_error() -> DashboardError {
    DashboardError::UpstreamStatus {
        status: 500,
        body: "internal error".to_string(),
    }
}
