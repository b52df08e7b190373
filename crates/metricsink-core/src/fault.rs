//! Panic boundary for background work.
//!
//! `catch` runs a closure under `catch_unwind` and, if it panics, returns a
//! `PanicReport` with the payload text, the panic location, and a backtrace
//! captured at the panic site. Capture goes through a process-wide hook
//! installed once. The hook only records panics raised inside `catch` on the
//! current thread; every other panic is forwarded to the previous hook.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// Diagnostic context of a caught panic.
#[derive(Debug, Clone)]
pub struct PanicReport {
    pub message: String,
    /// `file:line:col` of the panic, when the hook saw it.
    pub location: Option<String>,
    /// Backtrace rendered at the panic site. Empty when the hook did not run.
    pub backtrace: String,
}

struct Captured {
    location: Option<String>,
    backtrace: String,
}

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
    static CAPTURED: RefCell<Option<Captured>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

fn install_hook() {
    HOOK.call_once(|| {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARDED.try_with(Cell::get).unwrap_or(false) {
                let captured = Captured {
                    location: info.location().map(ToString::to_string),
                    backtrace: Backtrace::force_capture().to_string(),
                };
                let _ = CAPTURED.try_with(|slot| *slot.borrow_mut() = Some(captured));
            } else {
                prev(info);
            }
        }));
    });
}

/// Run `f`, converting a panic into a `PanicReport`.
pub fn catch<T>(f: impl FnOnce() -> T) -> Result<T, PanicReport> {
    install_hook();

    let was_guarded = GUARDED.with(|g| g.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    GUARDED.with(|g| g.set(was_guarded));

    outcome.map_err(|payload| {
        let captured = CAPTURED.with(|slot| slot.borrow_mut().take());
        let (location, backtrace) = match captured {
            Some(c) => (c.location, c.backtrace),
            None => (None, String::new()),
        };
        PanicReport {
            message: panic_message(payload.as_ref()),
            location,
            backtrace,
        }
    })
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
