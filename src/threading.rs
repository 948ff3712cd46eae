//! Logical-thread ownership of machines.
//!
//! Each machine belongs to one execution context, normally the message loop
//! that ticks it. The owner is captured as a [`ContextToken`] when the
//! machine is built. Every mutating machine operation then calls
//! [`assert_owning_thread`], which panics on a mismatch in debug builds and
//! compiles to nothing in release builds.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Identity of a logical execution context.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextToken(Uuid);

impl ContextToken {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }

    /// Token of the context the calling code runs in.
    ///
    /// Inside [`MessageLoop::enter`] this is the loop's token. Outside any
    /// loop each OS thread has its own implicit token.
    pub fn current() -> Self {
        CURRENT_LOOP
            .with(|current| current.get())
            .unwrap_or_else(|| THREAD_TOKEN.with(|token| *token))
    }
}

impl fmt::Debug for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextToken({})", self.0)
    }
}

impl fmt::Display for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

thread_local! {
    static THREAD_TOKEN: ContextToken = ContextToken::fresh();
    static CURRENT_LOOP: Cell<Option<ContextToken>> = const { Cell::new(None) };
}

/// A logical execution context that owns machines.
///
/// # Example
///
/// ```rust
/// use cmdr_action::threading::{ContextToken, MessageLoop};
///
/// let commander = MessageLoop::new("commander");
/// {
///     let _scope = commander.enter();
///     assert_eq!(ContextToken::current(), commander.token());
/// }
/// assert_ne!(ContextToken::current(), commander.token());
/// ```
#[derive(Debug, Clone)]
pub struct MessageLoop {
    name: String,
    token: ContextToken,
}

impl MessageLoop {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: ContextToken::fresh(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> ContextToken {
        self.token
    }

    /// Make this loop the current context of the calling thread until the
    /// returned scope is dropped. Scopes nest.
    pub fn enter(&self) -> LoopScope {
        let previous = CURRENT_LOOP.with(|current| current.replace(Some(self.token)));
        LoopScope {
            previous,
            _not_send: PhantomData,
        }
    }
}

/// RAII scope returned by [`MessageLoop::enter`].
#[must_use = "the loop is only current while the scope is alive"]
pub struct LoopScope {
    previous: Option<ContextToken>,
    // Scopes restore thread-local state and must drop on the thread that entered.
    _not_send: PhantomData<*const ()>,
}

impl Drop for LoopScope {
    fn drop(&mut self) {
        CURRENT_LOOP.with(|current| current.set(self.previous));
    }
}

/// Abort the calling thread if it is not running in `owner`'s context.
///
/// Only active with debug assertions. A violation is a contract breach, not
/// a recoverable condition.
#[track_caller]
#[inline]
pub fn assert_owning_thread(owner: ContextToken, operation: &str) {
    #[cfg(debug_assertions)]
    {
        let current = ContextToken::current();
        if current != owner {
            tracing::error!(%owner, %current, operation, "machine accessed from a foreign context");
            panic!(
                "`{operation}` called from context {current}, machine is owned by {owner}"
            );
        }
    }
    #[cfg(not(debug_assertions))]
    {
        let _ = (owner, operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_have_distinct_implicit_tokens() {
        let here = ContextToken::current();
        let there = std::thread::spawn(ContextToken::current).join().unwrap();
        assert_ne!(here, there);
        assert_eq!(here, ContextToken::current());
    }

    #[test]
    fn scopes_nest_and_restore() {
        let outer = MessageLoop::new("outer");
        let inner = MessageLoop::new("inner");
        let implicit = ContextToken::current();

        let outer_scope = outer.enter();
        {
            let _inner_scope = inner.enter();
            assert_eq!(ContextToken::current(), inner.token());
        }
        assert_eq!(ContextToken::current(), outer.token());
        drop(outer_scope);
        assert_eq!(ContextToken::current(), implicit);
    }

    #[test]
    fn loop_token_is_shared_across_threads() {
        let commander = MessageLoop::new("commander");
        let remote = commander.clone();
        let token = std::thread::spawn(move || {
            let _scope = remote.enter();
            ContextToken::current()
        })
        .join()
        .unwrap();
        assert_eq!(token, commander.token());
    }

    #[test]
    fn owner_passes_assertion() {
        assert_owning_thread(ContextToken::current(), "tick");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn foreign_context_panics() {
        let owner = ContextToken::current();
        let result = std::thread::spawn(move || assert_owning_thread(owner, "tick")).join();
        assert!(result.is_err());
    }
}
