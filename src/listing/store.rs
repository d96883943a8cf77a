//! Server-side list state.
//!
//! The session cookie only carries the signed-in [`SessionContext`]. The
//! [`ListView`] of every list a user opened lives here together with its
//! request generation, keyed by the user's cache scope and shared by all
//! workers. Views nobody touched for a while are swept.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::resource::Resource;
use crate::domain::session::SessionContext;
use crate::listing::fetcher::{ListFetcher, RequestTicket};
use crate::listing::view::ListView;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SlotKey {
    scope: String,
    resource: Resource,
}

impl SlotKey {
    fn new(session: &SessionContext, resource: Resource) -> Self {
        Self {
            scope: session.cache_scope().to_string(),
            resource,
        }
    }
}

#[derive(Debug)]
struct ViewSlot {
    view: ListView,
    fetcher: ListFetcher,
    touched: Instant,
}

impl ViewSlot {
    fn new() -> Self {
        Self {
            view: ListView::default(),
            fetcher: ListFetcher::new(),
            touched: Instant::now(),
        }
    }
}

/// What happened to a fetched page once it came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// The response belonged to the latest request and was folded into the
    /// stored view. `moved` is set when the page had to be pulled back.
    Applied { view: ListView, moved: bool },
    /// A newer request was dispatched meanwhile, or the user signed out.
    Stale,
}

/// Per-user, per-resource [`ListView`]s.
#[derive(Debug, Clone)]
pub struct ViewStore {
    slots: Arc<Mutex<HashMap<SlotKey, ViewSlot>>>,
    idle: Duration,
}

impl ViewStore {
    /// Views untouched for `idle` are dropped by [`ViewStore::purge_idle`].
    pub fn new(idle: Duration) -> Self {
        Self {
            slots: Arc::default(),
            idle,
        }
    }

    /// Stored view of `resource`, or a fresh one.
    pub fn view(&self, session: &SessionContext, resource: Resource) -> ListView {
        self.lock()
            .get(&SlotKey::new(session, resource))
            .map(|slot| slot.view.clone())
            .unwrap_or_default()
    }

    /// Runs `change` against the stored view of `resource`.
    pub fn update<T>(
        &self,
        session: &SessionContext,
        resource: Resource,
        change: impl FnOnce(&mut ListView) -> T,
    ) -> T {
        let mut slots = self.lock();
        let slot = slots
            .entry(SlotKey::new(session, resource))
            .or_insert_with(ViewSlot::new);
        slot.touched = Instant::now();
        change(&mut slot.view)
    }

    /// Dispatches a request for the current descriptor of `resource`,
    /// superseding any request still running for it.
    pub fn begin_fetch(
        &self,
        session: &SessionContext,
        resource: Resource,
    ) -> (ListView, RequestTicket) {
        let mut slots = self.lock();
        let slot = slots
            .entry(SlotKey::new(session, resource))
            .or_insert_with(ViewSlot::new);
        slot.touched = Instant::now();
        let ticket = slot.fetcher.begin(&slot.view.descriptor());
        (slot.view.clone(), ticket)
    }

    /// Settles `ticket`. Only the latest request may record `total_count`
    /// (`None` for a failed fetch) and re-clamp the stored page.
    pub fn settle(
        &self,
        session: &SessionContext,
        resource: Resource,
        ticket: RequestTicket,
        total_count: Option<usize>,
    ) -> Settled {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(&SlotKey::new(session, resource)) else {
            log::debug!("Dropping {resource} response, the list is gone");
            return Settled::Stale;
        };
        if !slot.fetcher.resolve(ticket) {
            return Settled::Stale;
        }
        let moved = total_count.is_some_and(|total| slot.view.reconcile(total));
        Settled::Applied {
            view: slot.view.clone(),
            moved,
        }
    }

    /// Forgets every view of one user. Returns how many were dropped.
    pub fn clear_scope(&self, scope: &str) -> usize {
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|key, _| key.scope != scope);
        before - slots.len()
    }

    /// Drops views untouched for longer than the idle window.
    pub fn purge_idle(&self) -> usize {
        let idle = self.idle;
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|_, slot| slot.touched.elapsed() < idle);
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SlotKey, ViewSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
