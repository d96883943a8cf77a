//! Row action dispatcher.
//!
//! `view`/`edit` resolve to a navigation. Mutating actions resolve to a
//! [`PendingAction`] that must be confirmed against the shared
//! [`InFlightRows`] before a [`ConfirmedAction`] exists, so a mutation cannot
//! be issued without confirmation and never twice at once for the same row.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::domain::resource::{Resource, RowAction};
use crate::domain::types::EntityId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("{action} is not available for {resource}")]
    Unsupported {
        resource: Resource,
        action: RowAction,
    },
    #[error("{action} on {resource}/{id} is already in progress")]
    AlreadyPending {
        resource: Resource,
        id: EntityId,
        action: RowAction,
    },
}

/// Backend call a confirmed action turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMutation {
    Delete,
    SetStatus(&'static str),
}

/// Outcome of routing a row click.
#[derive(Debug, PartialEq, Eq)]
pub enum Dispatch {
    Navigate(String),
    ConfirmationRequired(PendingAction),
}

pub fn dispatch(
    resource: Resource,
    id: EntityId,
    action: RowAction,
) -> Result<Dispatch, ActionError> {
    if !resource.supports(action) {
        return Err(ActionError::Unsupported { resource, action });
    }
    let dispatch = match action {
        RowAction::View => Dispatch::Navigate(format!("/{}/{}", resource.slug(), id)),
        RowAction::Edit => Dispatch::Navigate(format!("/{}/{}/edit", resource.slug(), id)),
        RowAction::Delete | RowAction::Approve | RowAction::Reject => {
            Dispatch::ConfirmationRequired(PendingAction {
                resource,
                id,
                action,
            })
        }
    };
    Ok(dispatch)
}

/// Mutating action waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    resource: Resource,
    id: EntityId,
    action: RowAction,
}

impl PendingAction {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn action(&self) -> RowAction {
        self.action
    }

    /// Text of the confirmation prompt.
    pub fn prompt(&self) -> String {
        format!(
            "{} this {}? This cannot be undone.",
            self.action.label(),
            self.resource.singular()
        )
    }

    /// Confirms the action, claiming its row. Fails while another mutation of
    /// the same row is in flight.
    pub fn confirm(self, rows: &InFlightRows) -> Result<ConfirmedAction, ActionError> {
        let key = RowKey {
            endpoint: self.resource.endpoint(),
            id: self.id.clone(),
        };
        match rows.acquire(key) {
            Some(guard) => Ok(ConfirmedAction {
                pending: self,
                _guard: guard,
            }),
            None => Err(ActionError::AlreadyPending {
                resource: self.resource,
                id: self.id,
                action: self.action,
            }),
        }
    }
}

/// Confirmed mutation. The row stays claimed until this value is dropped.
#[derive(Debug)]
pub struct ConfirmedAction {
    pending: PendingAction,
    _guard: InFlightGuard,
}

impl ConfirmedAction {
    pub fn resource(&self) -> Resource {
        self.pending.resource
    }

    pub fn id(&self) -> &EntityId {
        &self.pending.id
    }

    pub fn action(&self) -> RowAction {
        self.pending.action
    }

    pub fn mutation(&self) -> RowMutation {
        match self.pending.action {
            RowAction::Approve => RowMutation::SetStatus("approved"),
            RowAction::Reject => RowMutation::SetStatus("rejected"),
            _ => RowMutation::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    endpoint: &'static str,
    id: EntityId,
}

/// Rows with a mutation in flight, shared by all workers.
#[derive(Debug, Clone, Default)]
pub struct InFlightRows {
    rows: Arc<Mutex<HashSet<RowKey>>>,
}

impl InFlightRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a mutation on the row is currently running.
    pub fn is_pending(&self, resource: Resource, id: &EntityId) -> bool {
        let key = RowKey {
            endpoint: resource.endpoint(),
            id: id.clone(),
        };
        self.lock().contains(&key)
    }

    fn acquire(&self, key: RowKey) -> Option<InFlightGuard> {
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            rows: self.clone(),
            key,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<RowKey>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct InFlightGuard {
    rows: InFlightRows,
    key: RowKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.rows.lock().remove(&self.key);
    }
}
