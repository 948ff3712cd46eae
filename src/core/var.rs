//! Shared variable cells for passing data between transitions.
//!
//! An [`AstVar`] lets the output of one transition become the input of
//! another: both hold a handle to the same slot, so a write through one
//! handle is seen by every other holder immediately. Cells also let a
//! machine checkpoint and restore the data its transitions work with, so a
//! simulated run leaves real values untouched.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Zero-argument computation resolved on every read.
pub type Producer<T> = Arc<dyn Fn() -> T + Send + Sync>;

enum Slot<T> {
    Value(T),
    Producer(Producer<T>),
}

impl<T: Clone> Clone for Slot<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Producer(producer) => Self::Producer(Arc::clone(producer)),
        }
    }
}

/// A shared, optionally deferred value slot.
///
/// Cloning an `AstVar` clones the handle, not the contents.
///
/// # Example
///
/// ```rust
/// use cmdr_action::core::AstVar;
///
/// let target = AstVar::new(0u32);
/// let seen_by_move = target.clone();
///
/// target.set(7);
/// assert_eq!(seen_by_move.get(), 7);
///
/// // Deferred values are recomputed on every read.
/// let source = AstVar::new(3u32);
/// let probe = source.clone();
/// let doubled = AstVar::deferred(move || probe.get() * 2);
/// assert_eq!(doubled.get(), 6);
/// source.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub struct AstVar<T> {
    slot: Arc<RwLock<Slot<T>>>,
}

impl<T> Clone for AstVar<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> AstVar<T> {
    /// Create a cell holding a concrete value.
    pub fn new(value: T) -> Self {
        Self::from_slot(Slot::Value(value))
    }

    /// Create a cell whose value is computed by `producer` on every read.
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::from_slot(Slot::Producer(Arc::new(producer)))
    }

    fn from_slot(slot: Slot<T>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(slot)),
        }
    }

    /// Resolve the current value.
    ///
    /// The producer is called outside the lock so it may read other cells.
    pub fn get(&self) -> T {
        let producer = {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            match &*slot {
                Slot::Value(value) => return value.clone(),
                Slot::Producer(producer) => Arc::clone(producer),
            }
        };
        producer()
    }

    /// Replace the slot with a concrete value.
    pub fn set(&self, value: T) {
        self.replace(Slot::Value(value));
    }

    /// Replace the slot with a deferred computation.
    pub fn set_deferred<F>(&self, producer: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.replace(Slot::Producer(Arc::new(producer)));
    }

    /// Check whether the slot currently holds a producer.
    pub fn is_deferred(&self) -> bool {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        matches!(&*slot, Slot::Producer(_))
    }

    /// Check whether two handles refer to the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }

    /// Type-erased handle used by a machine to checkpoint this cell.
    pub fn handle(&self) -> VarHandle {
        VarHandle {
            var: Arc::new(self.clone()),
        }
    }

    fn replace(&self, slot: Slot<T>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = slot;
    }

    fn save_slot(&self) -> Slot<T> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T: Clone + fmt::Debug + Send + Sync + 'static> fmt::Debug for AstVar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Slot::Value(value) => f.debug_tuple("AstVar").field(value).finish(),
            Slot::Producer(_) => f.write_str("AstVar(<deferred>)"),
        }
    }
}

/// Saved slot contents, written back by [`SavedVar::restore`].
pub struct SavedVar {
    restore: Box<dyn FnOnce() + Send + Sync>,
}

impl SavedVar {
    /// Write the saved contents back into the cell.
    pub fn restore(self) {
        (self.restore)()
    }
}

impl fmt::Debug for SavedVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SavedVar")
    }
}

trait ErasedVar: Send + Sync {
    fn save(&self) -> SavedVar;
    fn id(&self) -> usize;
}

impl<T: Clone + Send + Sync + 'static> ErasedVar for AstVar<T> {
    fn save(&self) -> SavedVar {
        let var = self.clone();
        let slot = self.save_slot();
        SavedVar {
            restore: Box::new(move || var.replace(slot)),
        }
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.slot) as *const () as usize
    }
}

/// A cell of any value type, as tracked by a machine.
#[derive(Clone)]
pub struct VarHandle {
    var: Arc<dyn ErasedVar>,
}

impl VarHandle {
    /// Capture a deep copy of the current slot contents.
    ///
    /// A deferred slot is saved as the producer itself, not its result.
    pub fn save(&self) -> SavedVar {
        self.var.save()
    }

    /// Identity of the underlying slot. Equal for every handle of one cell.
    pub fn id(&self) -> usize {
        self.var.id()
    }
}

impl fmt::Debug for VarHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VarHandle").field("id", &self.id()).finish()
    }
}

impl<T: Clone + Send + Sync + 'static> From<&AstVar<T>> for VarHandle {
    fn from(var: &AstVar<T>) -> Self {
        var.handle()
    }
}
