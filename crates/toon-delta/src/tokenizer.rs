//! Token counting under a fixed BPE vocabulary.
//!
//! The vocabulary is expensive to build, so it lives behind a
//! [`TokenizerHandle`]: constructed lazily on first use, shared read-only
//! afterwards, and released once with [`TokenizerHandle::close`].
//!
//! ```
//! use toon_delta::tokenizer::{TokenCounter, TokenizerHandle, DEFAULT_MODEL};
//!
//! let handle = TokenizerHandle::new(DEFAULT_MODEL);
//! let n = handle.count("name: Alice").unwrap();
//! assert!(n > 0);
//! handle.close();
//! assert!(handle.count("name: Alice").is_err());
//! ```

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tiktoken_rs::CoreBPE;
use tracing::{debug, info, warn};

use crate::error::{DeltaError, Result};

/// Model whose vocabulary is used for every cost comparison (o200k_base).
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Anything that can turn text into a token count.
///
/// The comparator only sees this trait, so tests can plug in a fake vocabulary.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize>;
}

/// Token ids produced by one encode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence(Vec<u32>);

impl TokenSequence {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[u32] {
        &self.0
    }
}

/// A loaded BPE vocabulary for one model.
pub struct BpeTokenizer {
    model: String,
    bpe: CoreBPE,
}

impl BpeTokenizer {
    /// Load the vocabulary associated with `model`.
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = load_bpe(model).map_err(|message| DeltaError::TokenizerInit {
            model: model.to_string(),
            message,
        })?;
        Ok(Self {
            model: model.to_string(),
            bpe,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Encode `text` without special-token handling: text that happens to
    /// spell a special token is tokenized like any other text.
    pub fn encode(&self, text: &str) -> TokenSequence {
        TokenSequence(
            self.bpe
                .encode_ordinary(text)
                .into_iter()
                .map(|id| id as u32)
                .collect(),
        )
    }
}

impl std::fmt::Debug for BpeTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BpeTokenizer")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl TokenCounter for BpeTokenizer {
    fn count(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text).len())
    }
}

fn load_bpe(model: &str) -> std::result::Result<CoreBPE, String> {
    tiktoken_rs::get_bpe_from_model(model).map_err(|err| err.to_string())
}

enum Slot {
    Empty,
    Ready(Arc<BpeTokenizer>),
    /// Construction failed once; the failure is replayed, never retried.
    Failed(String),
    Closed,
}

/// Lazily constructed, explicitly released tokenizer.
///
/// Construction happens under a mutex, so concurrent first use builds the
/// vocabulary exactly once. Counting runs outside the lock on a shared
/// `Arc`, which also lets a count that is already running finish after
/// `close()`.
pub struct TokenizerHandle {
    model: String,
    slot: Mutex<Slot>,
}

static GLOBAL: OnceLock<TokenizerHandle> = OnceLock::new();

impl TokenizerHandle {
    /// Create an unloaded handle for `model`. No vocabulary work happens here.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// The process-wide handle for [`DEFAULT_MODEL`].
    pub fn global() -> &'static TokenizerHandle {
        GLOBAL.get_or_init(|| TokenizerHandle::new(DEFAULT_MODEL))
    }

    /// Close the process-wide handle, if it was ever created.
    pub fn shutdown() {
        if let Some(handle) = GLOBAL.get() {
            handle.close();
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resolve the loaded tokenizer, constructing it on first call.
    pub fn get(&self) -> Result<Arc<BpeTokenizer>> {
        let mut slot = self.lock();
        match &*slot {
            Slot::Ready(tokenizer) => return Ok(Arc::clone(tokenizer)),
            Slot::Failed(message) => {
                return Err(DeltaError::TokenizerInit {
                    model: self.model.clone(),
                    message: message.clone(),
                })
            }
            Slot::Closed => return Err(DeltaError::UseAfterClose),
            Slot::Empty => {}
        }

        info!(model = %self.model, "loading tokenizer vocabulary");
        match load_bpe(&self.model) {
            Ok(bpe) => {
                let tokenizer = Arc::new(BpeTokenizer {
                    model: self.model.clone(),
                    bpe,
                });
                *slot = Slot::Ready(Arc::clone(&tokenizer));
                Ok(tokenizer)
            }
            Err(message) => {
                warn!(model = %self.model, error = %message, "tokenizer vocabulary unavailable");
                *slot = Slot::Failed(message.clone());
                Err(DeltaError::TokenizerInit {
                    model: self.model.clone(),
                    message,
                })
            }
        }
    }

    /// Release the vocabulary. Idempotent; later use fails with
    /// [`DeltaError::UseAfterClose`].
    pub fn close(&self) {
        let mut slot = self.lock();
        if !matches!(*slot, Slot::Closed) {
            debug!(model = %self.model, "closing tokenizer handle");
            *slot = Slot::Closed;
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.lock(), Slot::Ready(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.lock(), Slot::Closed)
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenCounter for TokenizerHandle {
    fn count(&self, text: &str) -> Result<usize> {
        self.get()?.count(text)
    }
}

impl std::fmt::Debug for TokenizerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerHandle")
            .field("model", &self.model)
            .field("loaded", &self.is_loaded())
            .field("closed", &self.is_closed())
            .finish()
    }
}
