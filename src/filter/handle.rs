use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::task::{Context, Poll, Waker};
use std::time::Instant;

use futures::Stream;
use futures_timer::Delay;

use crate::value::{Record, Value};

use super::ordering::SortOrder;
use super::state::{FilterAction, FilterOptions, FilterQuery, FilterState};
use super::store::DebouncedFilter;

#[derive(Debug)]
struct Shared {
    store: DebouncedFilter,
    wakers: Vec<Waker>,
}

impl Shared {
    fn take_wakers(&mut self) -> Vec<Waker> {
        std::mem::take(&mut self.wakers)
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.store.cancel();
        for waker in self.take_wakers() {
            waker.wake();
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    match shared.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Filter state of one list view, debounced against the wall clock.
///
/// Setters update the raw state at once. The query accessors only move after
/// the debounce window passes with no further change. Dropping the handle
/// cancels any pending publication and ends every `changes` stream.
#[derive(Debug)]
pub struct FilterHandle {
    shared: Arc<Mutex<Shared>>,
}

impl FilterHandle {
    pub fn new(filter: Record, options: FilterOptions) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                store: DebouncedFilter::new(filter, &options),
                wakers: Vec::new(),
            })),
        }
    }

    fn update(&self, action: impl FnOnce(&FilterState) -> FilterAction) {
        let wakers = {
            let mut shared = lock(&self.shared);
            let action = action(shared.store.state());
            shared.store.dispatch_at(action, Instant::now());
            shared.take_wakers()
        };
        for waker in wakers {
            waker.wake();
        }
    }

    fn settled<R>(&self, read: impl FnOnce(&FilterQuery) -> R) -> R {
        let mut shared = lock(&self.shared);
        shared.store.tick(Instant::now());
        read(shared.store.query())
    }

    pub fn set_filter(&self, filter: Record, update_initial: bool) {
        self.update(|_| FilterAction::SetFilter {
            filter,
            update_initial,
        });
    }

    /// Derives the next filter from the current raw one.
    pub fn set_filter_with(&self, next: impl FnOnce(&Record) -> Record, update_initial: bool) {
        self.update(|state| FilterAction::SetFilter {
            filter: next(&state.filter),
            update_initial,
        });
    }

    pub fn set_filter_field(&self, value: impl Into<Value>, key: impl Into<String>) {
        let value = value.into();
        let key = key.into();
        self.update(|_| FilterAction::SetFilterField { key, value });
    }

    pub fn reset_filter(&self) {
        self.update(|_| FilterAction::ResetFilter);
    }

    pub fn set_ordering(&self, ordering: Option<SortOrder>) {
        self.update(|_| FilterAction::SetOrdering(ordering));
    }

    pub fn set_ordering_with(&self, next: impl FnOnce(Option<&SortOrder>) -> Option<SortOrder>) {
        self.update(|state| FilterAction::SetOrdering(next(state.ordering.as_ref())));
    }

    pub fn sort_by(&self, name: impl Into<String>) {
        let name = name.into();
        self.update(|_| FilterAction::SortBy(name));
    }

    pub fn set_page(&self, page: usize) {
        self.update(|_| FilterAction::SetPage(page));
    }

    pub fn set_page_size(&self, page_size: usize) {
        self.update(|_| FilterAction::SetPageSize(page_size));
    }

    pub fn raw_state(&self) -> FilterState {
        lock(&self.shared).store.state().clone()
    }

    pub fn raw_filter(&self) -> Record {
        lock(&self.shared).store.state().filter.clone()
    }

    pub fn initial_filter(&self) -> Record {
        lock(&self.shared).store.state().initial_filter.clone()
    }

    pub fn raw_ordering(&self) -> Option<SortOrder> {
        lock(&self.shared).store.state().ordering.clone()
    }

    /// Raw ordering as a query parameter.
    pub fn ordering_param(&self) -> Option<String> {
        lock(&self.shared).store.state().ordering_param()
    }

    pub fn is_filtered(&self) -> bool {
        lock(&self.shared).store.state().is_filtered()
    }

    pub fn is_filter_changed(&self) -> bool {
        lock(&self.shared).store.state().is_filter_changed()
    }

    /// Latest settled query.
    pub fn query(&self) -> FilterQuery {
        self.settled(Clone::clone)
    }

    pub fn filter(&self) -> Record {
        self.settled(|query| query.filter.clone())
    }

    pub fn ordering(&self) -> Option<String> {
        self.settled(|query| query.ordering.clone())
    }

    pub fn page(&self) -> usize {
        self.settled(|query| query.page)
    }

    pub fn page_size(&self) -> usize {
        self.settled(|query| query.page_size)
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.shared).store.deadline().is_some()
    }

    /// Publishes the pending query without waiting out the window.
    pub fn flush(&self) -> Option<FilterQuery> {
        let (published, wakers) = {
            let mut shared = lock(&self.shared);
            let published = shared.store.flush();
            (published, shared.take_wakers())
        };
        for waker in wakers {
            waker.wake();
        }
        published
    }

    /// Stream of queries published after this call.
    pub fn changes(&self) -> FilterChanges {
        let seen = lock(&self.shared).store.version();
        FilterChanges {
            shared: Arc::downgrade(&self.shared),
            seen,
            delay: None,
        }
    }
}

pub struct FilterChanges {
    shared: Weak<Mutex<Shared>>,
    seen: u64,
    delay: Option<Delay>,
}

impl Debug for FilterChanges {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChanges")
            .field("seen", &self.seen)
            .field("waiting", &self.delay.is_some())
            .finish()
    }
}

impl Stream for FilterChanges {
    type Item = FilterQuery;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(shared) = this.shared.upgrade() else {
                this.delay = None;
                return Poll::Ready(None);
            };

            let remaining = {
                let mut guard = lock(&shared);
                let now = Instant::now();
                guard.store.tick(now);
                if guard.store.version() != this.seen {
                    this.seen = guard.store.version();
                    this.delay = None;
                    return Poll::Ready(Some(guard.store.query().clone()));
                }
                if !guard.wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                    guard.wakers.push(cx.waker().clone());
                }
                guard
                    .store
                    .deadline()
                    .map(|deadline| deadline.saturating_duration_since(now))
            };
            drop(shared);

            let Some(remaining) = remaining else {
                this.delay = None;
                return Poll::Pending;
            };
            let delay = this.delay.get_or_insert_with(|| Delay::new(remaining));
            delay.reset(remaining);
            match Pin::new(delay).poll(cx) {
                Poll::Ready(()) => continue,
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
