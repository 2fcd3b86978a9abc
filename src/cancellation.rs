//! Wires `SIGINT` into the shared cancellation `AtomicBool` the library's
//! engine and pipeline poll at their documented suspension points (spec
//! §5). Not part of the library crate: the core only requires *a*
//! `Arc<AtomicBool>`, not a particular signal source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};

static TARGET: AtomicPtr<AtomicBool> = AtomicPtr::new(std::ptr::null_mut());

#[cfg(unix)]
extern "C" fn on_sigint(_signum: libc::c_int) {
    let ptr = TARGET.load(Ordering::SeqCst);
    if let Some(flag) = unsafe { ptr.as_ref() } {
        flag.store(true, Ordering::SeqCst);
    }
}

/// Returns a fresh cancellation flag and arranges for `Ctrl-C` to set it.
/// The flag is intentionally leaked for the process lifetime: a CLI
/// invocation creates exactly one of these.
pub fn install_sigint_handler() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));

    #[cfg(unix)]
    {
        let raw = Arc::into_raw(flag.clone()) as *mut AtomicBool;
        TARGET.store(raw, Ordering::SeqCst);
        unsafe {
            libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
        }
    }

    flag
}
