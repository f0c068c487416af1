//! Re-entrancy suppression for propagation writes.
//!
//! Writing propagated content into an open editor makes the host fire its
//! change notification again, which would re-enter the engine and loop.
//! The guard is a single flag held exactly while the propagator writes to
//! an open editor; the change entry point returns immediately while it is
//! held.
//!
//! The flag is set through a scoped [`WriteToken`] so it is cleared on
//! every exit path, including panics in the host's write callback.

use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide flag suppressing recursive propagation.
///
/// Set only by the propagator (via [`ReentrancyGuard::hold`]), read only by
/// the change-notification entry point.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    writing: AtomicBool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a propagation write to an open editor is in progress.
    pub fn is_held(&self) -> bool {
        self.writing.load(Ordering::Acquire)
    }

    /// Set the flag for the lifetime of the returned token.
    pub fn hold(&self) -> WriteToken<'_> {
        self.writing.store(true, Ordering::Release);
        WriteToken { guard: self }
    }
}

/// RAII token: the guard stays held until this drops.
#[must_use = "the guard releases as soon as the token drops"]
pub struct WriteToken<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for WriteToken<'_> {
    fn drop(&mut self) {
        self.guard.writing.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_exactly_while_token_lives() {
        let guard = ReentrancyGuard::new();
        assert!(!guard.is_held());
        {
            let _token = guard.hold();
            assert!(guard.is_held());
        }
        assert!(!guard.is_held());
    }

    #[test]
    fn released_when_the_holding_scope_panics() {
        let guard = ReentrancyGuard::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _token = guard.hold();
            panic!("write failed");
        }));
        assert!(result.is_err());
        assert!(!guard.is_held());
    }
}
