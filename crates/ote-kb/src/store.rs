//! Triplestore abstraction and in-memory backend

use crate::error::{KbError, KbResult};
use crate::term::{Term, Triple};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Handle to an RDF triplestore
///
/// A handle is obtained from a [`TriplestoreConnector`](crate::TriplestoreConnector)
/// and released with [`Triplestore::close`]. Closing is synchronous so a
/// guard can release the handle from `Drop`.
#[async_trait]
pub trait Triplestore: Send + Sync {
    /// Backend name for logging
    fn backend(&self) -> &str;

    /// Assert triples
    ///
    /// # Errors
    /// Returns [`KbError::Closed`] after close, or [`KbError::Store`]
    async fn add_triples(&self, triples: &[Triple]) -> KbResult<()>;

    /// Triples matching an optional (subject, predicate, object) pattern
    ///
    /// # Errors
    /// Returns [`KbError::Closed`] after close, or [`KbError::Store`]
    async fn triples(
        &self,
        subject: Option<&Term>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> KbResult<Vec<Triple>>;

    /// Release the handle
    ///
    /// # Errors
    /// Returns [`KbError::Store`] if the backend fails to flush
    fn close(&self) -> KbResult<()>;

    /// Objects of `(subject, predicate, ?)`
    ///
    /// # Errors
    /// See [`Triplestore::triples`]
    async fn objects(&self, subject: &Term, predicate: &str) -> KbResult<Vec<Term>> {
        Ok(self
            .triples(Some(subject), Some(predicate), None)
            .await?
            .into_iter()
            .map(|t| t.object)
            .collect())
    }
}

#[derive(Debug, Default)]
struct SharedGraph {
    triples: RwLock<Vec<Triple>>,
    closes: AtomicUsize,
    fail_writes: AtomicBool,
}

/// In-memory triplestore
///
/// Cloned handles share one graph; [`MemoryTriplestore::handle`] creates a
/// new handle with its own open/closed state over the same graph.
#[derive(Debug, Clone, Default)]
pub struct MemoryTriplestore {
    graph: Arc<SharedGraph>,
    closed: Arc<AtomicBool>,
}

impl MemoryTriplestore {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// New open handle over the same graph
    #[must_use]
    pub fn handle(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Snapshot of every triple
    #[must_use]
    pub fn snapshot(&self) -> Vec<Triple> {
        self.graph.triples.read().clone()
    }

    /// Number of triples
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.triples.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// How many handles over this graph have been closed
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.graph.closes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.graph.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Assert triples without going through a connection
    pub fn insert_all(&self, triples: impl IntoIterator<Item = Triple>) {
        let mut graph = self.graph.triples.write();
        for triple in triples {
            if !graph.contains(&triple) {
                graph.push(triple);
            }
        }
    }

    fn ensure_open(&self) -> KbResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(KbError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl Triplestore for MemoryTriplestore {
    fn backend(&self) -> &str {
        "memory"
    }

    async fn add_triples(&self, triples: &[Triple]) -> KbResult<()> {
        self.ensure_open()?;
        if self.graph.fail_writes.load(Ordering::SeqCst) {
            return Err(KbError::Store("writes are disabled".to_string()));
        }
        self.insert_all(triples.iter().cloned());
        Ok(())
    }

    async fn triples(
        &self,
        subject: Option<&Term>,
        predicate: Option<&str>,
        object: Option<&Term>,
    ) -> KbResult<Vec<Triple>> {
        self.ensure_open()?;
        Ok(self
            .graph
            .triples
            .read()
            .iter()
            .filter(|t| t.matches(subject, predicate, object))
            .cloned()
            .collect())
    }

    fn close(&self) -> KbResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.graph.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
