//! Request generations of one list: only the latest dispatched descriptor may
//! settle the list state.

use crate::listing::query::QueryDescriptor;

/// Tag attached to a dispatched request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    descriptor: QueryDescriptor,
}

impl RequestTicket {
    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }
}

/// Tracks the request generation of one list view.
///
/// Lives next to the view in the shared [`ViewStore`](crate::listing::store::ViewStore),
/// so requests racing from two tabs or a double click meet here. A response is
/// applied only for the most recently dispatched ticket; a slow earlier
/// response can never overwrite a faster later one. Identical concurrent
/// requests share one backend call through the query cache.
#[derive(Debug, Default)]
pub struct ListFetcher {
    generation: u64,
    in_flight: Option<RequestTicket>,
}

impl ListFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request for `descriptor`, superseding any earlier one.
    pub fn begin(&mut self, descriptor: &QueryDescriptor) -> RequestTicket {
        self.generation += 1;
        let ticket = RequestTicket {
            generation: self.generation,
            descriptor: descriptor.clone(),
        };
        self.in_flight = Some(ticket.clone());
        ticket
    }

    /// Whether `ticket` is still the latest dispatched request.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|t| t.generation == ticket.generation)
    }

    /// Settles `ticket`. Stale tickets are dropped and `false` is returned.
    pub fn resolve(&mut self, ticket: RequestTicket) -> bool {
        if !self.is_current(&ticket) {
            log::debug!(
                "Discarding stale list response for page {}",
                ticket.descriptor.page
            );
            return false;
        }
        self.in_flight = None;
        true
    }
}
