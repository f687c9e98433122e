use std::time::Instant;

use tracing::{debug, trace};

use crate::value::Record;

use super::debounce::Debouncer;
use super::state::{FilterAction, FilterOptions, FilterQuery, FilterState, reduce};

/// Filter state plus its debounced query, driven by caller-supplied instants.
#[derive(Clone, Debug)]
pub struct DebouncedFilter {
    state: FilterState,
    query: Debouncer<FilterQuery>,
}

impl DebouncedFilter {
    pub fn new(filter: Record, options: &FilterOptions) -> Self {
        let state = FilterState::new(filter, options);
        let query = Debouncer::new(state.query(), options.debounce());
        Self { state, query }
    }

    /// Raw state; reflects every dispatched action immediately.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Last published query.
    pub fn query(&self) -> &FilterQuery {
        self.query.published()
    }

    pub fn version(&self) -> u64 {
        self.query.version()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.query.deadline()
    }

    pub fn dispatch_at(&mut self, action: FilterAction, now: Instant) {
        trace!(?action, "filter action");
        self.state = reduce(&self.state, action);
        self.query.schedule(self.state.query(), now);
    }

    /// Publishes the pending query if its window has elapsed at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<FilterQuery> {
        let published = self.query.poll(now).cloned();
        if let Some(query) = &published {
            debug!(
                page = query.page,
                page_size = query.page_size,
                ordering = query.ordering.as_deref().unwrap_or(""),
                "filter query published"
            );
        }
        published
    }

    pub fn flush(&mut self) -> Option<FilterQuery> {
        self.query.flush().cloned()
    }

    pub fn cancel(&mut self) -> bool {
        self.query.cancel()
    }
}
