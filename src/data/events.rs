//! Lifecycle notifications.
//!
//! A process-wide subscriber list. Callbacks run synchronously on the thread
//! that mutated the data. The subscriber lock is released before they run, so
//! a callback may subscribe or unsubscribe without deadlocking.
//!
//! Inside [`deferred`] (every registry write runs there) events are queued
//! and delivered once the closure returns, after the registry lock is
//! released. Subscribers may then read the registry from their callback.

use parking_lot::RwLock;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::context::{ContextMode, ItemType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataEvent {
    ItemAdded {
        item_type: ItemType,
        category: Option<String>,
        item: String,
    },
    /// Fired before the item leaves its collection.
    ItemRemoved {
        item_type: ItemType,
        category: Option<String>,
        item: String,
    },
    ItemMovePre {
        item_type: ItemType,
        item: String,
        from: Option<String>,
        to: Option<String>,
    },
    ItemMovePost {
        item_type: ItemType,
        item: String,
        from: Option<String>,
        to: Option<String>,
    },
    CategoryAdded {
        item_type: ItemType,
        category: String,
    },
    /// Fired before the category is deleted.
    CategoryRemoved {
        item_type: ItemType,
        category: String,
    },
    DataSaved {
        mode: ContextMode,
        path: PathBuf,
    },
    DataLoaded {
        mode: ContextMode,
        path: PathBuf,
    },
    DataInitialized {
        mode: ContextMode,
    },
    ImportProgress {
        mode: ContextMode,
        textures_left: usize,
        brushes_left: usize,
    },
    ImportFinished {
        mode: ContextMode,
        library: PathBuf,
        textures: usize,
        brushes: usize,
    },
    ImportCancelled {
        mode: ContextMode,
        library: PathBuf,
        reason: String,
    },
}

pub type SubscriptionId = u64;

type Callback = Arc<dyn Fn(&DataEvent) + Send + Sync>;

struct Subscribers {
    next_id: SubscriptionId,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

static SUBSCRIBERS: RwLock<Subscribers> = RwLock::new(Subscribers {
    next_id: 1,
    callbacks: Vec::new(),
});

pub fn subscribe<F>(callback: F) -> SubscriptionId
where
    F: Fn(&DataEvent) + Send + Sync + 'static,
{
    let mut guard = SUBSCRIBERS.write();
    let id = guard.next_id;
    guard.next_id = guard.next_id.saturating_add(1);
    guard.callbacks.push((id, Arc::new(callback)));
    id
}

pub fn unsubscribe(id: SubscriptionId) -> bool {
    let mut guard = SUBSCRIBERS.write();
    let before = guard.callbacks.len();
    guard.callbacks.retain(|(sub_id, _)| *sub_id != id);
    guard.callbacks.len() != before
}

thread_local! {
    /// Events held back by an enclosing [`deferred`] call on this thread.
    static HELD: RefCell<Option<Vec<DataEvent>>> = const { RefCell::new(None) };
}

/// Drops held events if the deferred closure unwinds.
struct HoldGuard;

impl Drop for HoldGuard {
    fn drop(&mut self) {
        HELD.with(|held| held.borrow_mut().take());
    }
}

/// Run `f`, delivering every event it emits only after it has returned.
/// Nested calls join the outermost one.
pub fn deferred<R>(f: impl FnOnce() -> R) -> R {
    let outermost = HELD.with(|held| {
        let mut held = held.borrow_mut();
        if held.is_some() {
            return false;
        }
        *held = Some(Vec::new());
        true
    });
    if !outermost {
        return f();
    }

    let guard = HoldGuard;
    let result = f();
    let pending = HELD.with(|held| held.borrow_mut().take()).unwrap_or_default();
    drop(guard);

    for event in &pending {
        dispatch(event);
    }
    result
}

pub fn emit(event: &DataEvent) {
    let held = HELD.with(|held| match held.borrow_mut().as_mut() {
        Some(queue) => {
            queue.push(event.clone());
            true
        }
        None => false,
    });
    if !held {
        dispatch(event);
    }
}

fn dispatch(event: &DataEvent) {
    let callbacks: Vec<Callback> = {
        let guard = SUBSCRIBERS.read();
        if guard.callbacks.is_empty() {
            return;
        }
        guard.callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    };

    for callback in callbacks {
        callback(event);
    }
}
