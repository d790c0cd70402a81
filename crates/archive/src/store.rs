//! Transaction store boundary
//!
//! The writer consumes any `Stream` of stored transactions. A store may
//! suspend between items (paging from disk or a database); the writer awaits
//! each one before touching the next.

use futures_util::stream::{self, BoxStream, StreamExt};

use crate::error::StoreError;
use crate::model::StoredTransaction;

/// Source of stored transactions, read-only from the writer's perspective
pub trait TransactionStore: Send + Sync {
    /// Lazily yield every stored transaction in store order
    fn transactions(&self) -> BoxStream<'_, Result<StoredTransaction, StoreError>>;
}

/// Store backed by a `Vec`, yielding to the runtime between items
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Vec<StoredTransaction>,
    fail_at: Option<usize>,
}

impl MemoryStore {
    pub fn new(items: Vec<StoredTransaction>) -> Self {
        Self {
            items,
            fail_at: None,
        }
    }

    /// Load a JSON array dump of stored transactions
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Fail with a read error instead of yielding item `index`
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TransactionStore for MemoryStore {
    fn transactions(&self) -> BoxStream<'_, Result<StoredTransaction, StoreError>> {
        let fail_at = self.fail_at;
        stream::iter(self.items.iter().enumerate())
            .then(move |(index, tx)| async move {
                tokio::task::yield_now().await;
                if fail_at == Some(index) {
                    return Err(StoreError::read(index, "injected read failure"));
                }
                Ok(tx.clone())
            })
            .boxed()
    }
}
