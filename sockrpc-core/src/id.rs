//! Request identifier generation
//!
//! A session asks its [`IdGenerator`] for a fresh [`Id`] on every `call`.
//! The only requirement is uniqueness among the calls still outstanding on
//! that session. Two outstanding calls with the same id collide: the newer
//! registration replaces the older one, which then never resolves.
//!
//! - [`IdGenerator::uuid`] (default): random UUID v4 strings, 122 bits of
//!   entropy
//! - [`IdGenerator::sequential`]: `0, 1, 2, ...` as numeric ids
//! - [`IdGenerator::sequential_from`]: the same, from a chosen start
//! - [`IdGenerator::from_fn`]: any closure
//!
//! Generators are cheap to clone and scoped to whichever session holds them.

use crate::types::Id;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Strategy producing identifiers for outgoing requests
#[derive(Clone)]
pub struct IdGenerator {
    generate: Arc<dyn Fn() -> Id + Send + Sync>,
}

impl IdGenerator {
    /// Random UUID v4 identifiers in the hyphenated textual form
    pub fn uuid() -> Self {
        Self::from_fn(|| Id::String(uuid::Uuid::new_v4().to_string()))
    }

    /// Numeric identifiers counting up from zero
    pub fn sequential() -> Self {
        Self::sequential_from(0)
    }

    /// Numeric identifiers counting up from `start`
    ///
    /// The count stays within `i64`: once it reaches `i64::MAX` it
    /// continues from zero rather than going negative.
    pub fn sequential_from(start: i64) -> Self {
        let counter = Arc::new(AtomicI64::new(start.max(0)));
        Self::from_fn(move || {
            let n = counter
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                    Some(n.checked_add(1).unwrap_or(0))
                })
                .unwrap_or_else(|n| n);
            Id::Number(n)
        })
    }

    /// Identifiers from a caller-supplied function
    ///
    /// ```rust
    /// use sockrpc_core::{Id, IdGenerator};
    ///
    /// let fixed = IdGenerator::from_fn(|| Id::from("always-the-same"));
    /// assert_eq!(fixed.next_id(), Id::from("always-the-same"));
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn() -> Id + Send + Sync + 'static,
    {
        Self {
            generate: Arc::new(f),
        }
    }

    pub fn next_id(&self) -> Id {
        (self.generate)()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::uuid()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
