//! Per-frame update callbacks.
//!
//! Callbacks run once per frame, before structures are uploaded and drawn,
//! with the global context unlocked so they may edit registered meshes.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

type UpdateCallback = Box<dyn FnMut() + Send>;

/// Opaque handle returned by [`add_update_callback`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(u64);

#[derive(Default)]
struct Callbacks {
    next: u64,
    live: HashSet<u64>,
    entries: Vec<(u64, UpdateCallback)>,
}

static CALLBACKS: Mutex<Option<Callbacks>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<Callbacks>> {
    CALLBACKS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers `f` to run once per frame. Callbacks run in registration order.
pub fn add_update_callback(f: impl FnMut() + Send + 'static) -> CallbackToken {
    let mut guard = lock();
    let callbacks = guard.get_or_insert_with(Callbacks::default);
    let id = callbacks.next;
    callbacks.next += 1;
    callbacks.live.insert(id);
    callbacks.entries.push((id, Box::new(f)));
    CallbackToken(id)
}

/// Unregisters a callback. Returns `false` if the token was already removed.
///
/// Safe to call from inside a running callback; the removed callback is not
/// invoked again.
pub fn remove_update_callback(token: CallbackToken) -> bool {
    let mut guard = lock();
    let Some(callbacks) = guard.as_mut() else {
        return false;
    };
    if !callbacks.live.remove(&token.0) {
        return false;
    }
    callbacks.entries.retain(|(id, _)| *id != token.0);
    true
}

/// Removes every callback.
pub fn clear_update_callbacks() {
    *lock() = None;
}

/// Number of registered callbacks.
pub fn num_update_callbacks() -> usize {
    lock().as_ref().map_or(0, |c| c.live.len())
}

/// Runs every registered callback once.
///
/// The callbacks are taken out of the registry while they run, so they may
/// add or remove callbacks themselves.
pub(crate) fn run_update_callbacks() {
    let mut running = match lock().as_mut() {
        Some(callbacks) => std::mem::take(&mut callbacks.entries),
        None => return,
    };

    for (id, callback) in &mut running {
        let live = lock().as_ref().is_some_and(|c| c.live.contains(id));
        if live {
            callback();
        }
    }

    let mut guard = lock();
    let Some(callbacks) = guard.as_mut() else {
        return;
    };
    let added = std::mem::take(&mut callbacks.entries);
    callbacks.entries = running
        .into_iter()
        .chain(added)
        .filter(|(id, _)| callbacks.live.contains(id))
        .collect();
}
