//! Transaction wrapper
//!
//! Runs a closure between `begin()` and `commit()` on a [`RecordStore`] and
//! rolls back when anything fails:
//!
//! ```text
//! 1. begin()                  - open transaction (or nested savepoint)
//! 2. f(store)                 - shifts + single-record writes
//! 3. IF f failed: rollback()  - return f's error
//! 4. commit()
//! 5. IF commit failed: rollback() - return the commit error
//! ```
//!
//! The first failure is always the one returned. A failed rollback is
//! logged; it cannot be reported to the caller without hiding the cause.

use sortable_core::Result;
use sortable_storage::RecordStore;
use tracing::{error, warn};

/// Run `f` atomically against `store`
///
/// Either every write `f` performs commits, or none does. Nests inside a
/// transaction the caller already opened.
///
/// # Example
///
/// ```ignore
/// let moved = transaction(&store, |store| {
///     store.update_many(&filter, Shift::Decrement)?;
///     store.update_one(key, &[(field, Value::Int(3))])?;
///     Ok(())
/// })?;
/// ```
pub fn transaction<S, T, F>(store: &S, f: F) -> Result<T>
where
    S: RecordStore + ?Sized,
    F: FnOnce(&S) -> Result<T>,
{
    store.begin()?;

    let value = match f(store) {
        Ok(value) => value,
        Err(e) => {
            rollback_after(store, &e);
            return Err(e);
        }
    };

    if let Err(e) = store.commit() {
        rollback_after(store, &e);
        return Err(e);
    }
    Ok(value)
}

fn rollback_after<S: RecordStore + ?Sized>(store: &S, cause: &sortable_core::Error) {
    match store.rollback() {
        Ok(()) => warn!(error = %cause, "Transaction rolled back"),
        Err(rb) => error!(
            error = %cause,
            rollback_error = %rb,
            "Rollback failed; store may hold partial writes"
        ),
    }
}
