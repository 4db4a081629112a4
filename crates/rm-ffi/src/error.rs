use std::cell::RefCell;
use std::ffi::CString;

use rm_blas::BlasError;

use crate::types::RmStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `rm_last_error`.
pub fn set_last_error(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Record `err` as the last error and return its status code.
pub fn report(err: &BlasError) -> RmStatus {
    set_last_error(err.to_string());
    RmStatus::from(err)
}

/// Convert an operation's outcome into a status, recording any failure.
pub fn status_of(result: rm_blas::Result<()>) -> RmStatus {
    match result {
        Ok(()) => RmStatus::Success,
        Err(e) => report(&e),
    }
}
