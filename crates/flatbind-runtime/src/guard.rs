//! Failure containment at the boundary.
//!
//! Nothing may unwind across an `extern "C"` export. Work runs under
//! [`guard`], which turns a panic into a process abort; conditions the
//! caller cannot recover from (a null handle, an index past the end) go
//! straight to [`trap`].

use std::panic::{catch_unwind, UnwindSafe};

use tracing::error;

/// Terminate the process. The defined outcome for contract violations that
/// have no error channel across the boundary.
#[cold]
pub fn trap(detail: &str) -> ! {
    error!(detail, "boundary trap");
    std::process::abort()
}

/// Run `f`, aborting the process if it panics.
pub fn guard<R>(f: impl FnOnce() -> R + UnwindSafe) -> R {
    match catch_unwind(f) {
        Ok(value) => value,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic".to_string());
            trap(&detail)
        }
    }
}

/// Borrow a caller-supplied handle, trapping on null.
///
/// # Safety
/// `ptr` must be null or point to a live `T` that is not mutated elsewhere
/// for the duration of the returned borrow.
pub unsafe fn require<'a, T>(ptr: *const T, what: &str) -> &'a T {
    match unsafe { ptr.as_ref() } {
        Some(value) => value,
        None => trap(&format!("null {what}")),
    }
}

/// Mutably borrow a caller-supplied handle, trapping on null.
///
/// # Safety
/// `ptr` must be null or point to a live `T` with no other outstanding
/// borrow for the duration of the returned one.
pub unsafe fn require_mut<'a, T>(ptr: *mut T, what: &str) -> &'a mut T {
    match unsafe { ptr.as_mut() } {
        Some(value) => value,
        None => trap(&format!("null {what}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_passes_values_through() {
        assert_eq!(guard(|| 41 + 1), 42);
    }

    #[test]
    fn require_borrows_non_null() {
        let value = 7u32;
        let borrowed = unsafe { require(&value as *const u32, "value") };
        assert_eq!(*borrowed, 7);

        let mut slot = String::from("a");
        unsafe { require_mut(&mut slot as *mut String, "slot") }.push('b');
        assert_eq!(slot, "ab");
    }
}
