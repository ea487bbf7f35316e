//! Scoped triplestore connection

use crate::error::{KbError, KbResult};
use crate::settings::{TriplestoreConnector, TriplestoreSettings};
use crate::store::Triplestore;
use crate::term::Triple;
use std::sync::Arc;
use std::time::Duration;

/// Open triplestore handle that is closed exactly once
///
/// Call [`Connection::close`] to observe close errors; otherwise the handle
/// is closed when the guard is dropped.
pub struct Connection {
    store: Arc<dyn Triplestore>,
    closed: bool,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("backend", &self.store.backend())
            .field("closed", &self.closed)
            .finish()
    }
}

impl Connection {
    /// Wrap an open handle
    #[must_use]
    pub fn new(store: Arc<dyn Triplestore>) -> Self {
        Self { store, closed: false }
    }

    /// Connect through `connector`, failing after `timeout`
    ///
    /// # Errors
    /// Returns [`KbError::Timeout`] or whatever the connector reports
    pub async fn open(
        connector: &dyn TriplestoreConnector,
        settings: &TriplestoreSettings,
        timeout: Duration,
    ) -> KbResult<Self> {
        let store = tokio::time::timeout(timeout, connector.connect(settings))
            .await
            .map_err(|_| KbError::Timeout(timeout))??;
        tracing::debug!(backend = store.backend(), "triplestore connection opened");
        Ok(Self::new(store))
    }

    /// The underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &dyn Triplestore {
        self.store.as_ref()
    }

    /// Assert triples
    ///
    /// # Errors
    /// See [`Triplestore::add_triples`]
    pub async fn add_triples(&self, triples: &[Triple]) -> KbResult<()> {
        self.store.add_triples(triples).await
    }

    /// Close the handle and report the outcome
    ///
    /// # Errors
    /// See [`Triplestore::close`]
    pub fn close(mut self) -> KbResult<()> {
        self.closed = true;
        self.store.close()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.store.close() {
            tracing::warn!(error = %err, "closing triplestore connection failed");
        }
    }
}
