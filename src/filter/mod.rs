mod debounce;
mod handle;
mod ordering;
mod state;
mod store;
#[cfg(test)]
mod tests;

pub use debounce::Debouncer;
pub use handle::{FilterChanges, FilterHandle};
pub use ordering::{OrderingParseError, SortDirection, SortOrder};
pub use state::{FilterAction, FilterOptions, FilterQuery, FilterState, reduce};
pub use store::DebouncedFilter;
