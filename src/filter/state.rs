use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::value::{Record, Value};

use super::ordering::SortOrder;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterOptions {
    pub ordering: Option<SortOrder>,
    pub page: usize,
    pub page_size: usize,
    pub debounce_ms: u64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            ordering: None,
            page: 1,
            page_size: 10,
            debounce_ms: 200,
        }
    }
}

impl FilterOptions {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Raw filter, sort and pagination state of one list view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterState {
    pub filter: Record,
    /// Baseline for `reset` and for `is_filter_changed`.
    pub initial_filter: Record,
    pub ordering: Option<SortOrder>,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterAction {
    SetFilter { filter: Record, update_initial: bool },
    SetFilterField { key: String, value: Value },
    ResetFilter,
    SetOrdering(Option<SortOrder>),
    /// Header click: flips the direction of the current column, or sorts a new one ascending.
    SortBy(String),
    SetPage(usize),
    SetPageSize(usize),
}

/// Snapshot handed to a data query.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterQuery {
    pub filter: Record,
    pub ordering: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

impl FilterState {
    pub fn new(filter: Record, options: &FilterOptions) -> Self {
        Self {
            initial_filter: filter.clone(),
            filter,
            ordering: options.ordering.clone(),
            page: options.page.max(1),
            page_size: options.page_size.max(1),
        }
    }

    pub fn ordering_param(&self) -> Option<String> {
        self.ordering.as_ref().map(SortOrder::to_param)
    }

    /// True if any criterion is set to something other than null, empty text,
    /// an empty list or an empty record.
    pub fn is_filtered(&self) -> bool {
        self.filter.values().any(is_criterion)
    }

    pub fn is_filter_changed(&self) -> bool {
        criteria(&self.filter) != criteria(&self.initial_filter)
    }

    pub fn query(&self) -> FilterQuery {
        FilterQuery {
            filter: self.filter.clone(),
            ordering: self.ordering_param(),
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Applies one transition. Any change to the filter, the ordering or the page
/// size moves back to the first page.
pub fn reduce(state: &FilterState, action: FilterAction) -> FilterState {
    let mut next = state.clone();
    match action {
        FilterAction::SetFilter {
            filter,
            update_initial,
        } => {
            if update_initial {
                next.initial_filter = filter.clone();
            }
            next.filter = filter;
            next.page = 1;
        }
        FilterAction::SetFilterField { key, value } => {
            next.filter = next.filter.update(key, value);
            next.page = 1;
        }
        FilterAction::ResetFilter => {
            next.filter = next.initial_filter.clone();
            next.page = 1;
        }
        FilterAction::SetOrdering(ordering) => {
            next.ordering = ordering;
            next.page = 1;
        }
        FilterAction::SortBy(name) => {
            next.ordering = Some(match next.ordering.take() {
                Some(current) if current.name == name => current.toggled(),
                _ => SortOrder::asc(name),
            });
            next.page = 1;
        }
        FilterAction::SetPage(page) => next.page = page.max(1),
        FilterAction::SetPageSize(page_size) => {
            next.page_size = page_size.max(1);
            next.page = 1;
        }
    }
    next
}

impl FilterQuery {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Query variables: the set criteria plus `ordering`, `page` and `pageSize`.
    pub fn variables(&self) -> serde_json::Value {
        let mut variables = serde_json::Map::new();
        for (key, value) in self.filter.iter().filter(|(_, value)| is_criterion(value)) {
            variables.insert(key.clone(), value.to_json());
        }
        if let Some(ordering) = &self.ordering {
            variables.insert("ordering".to_owned(), ordering.clone().into());
        }
        variables.insert("page".to_owned(), self.page.into());
        variables.insert("pageSize".to_owned(), self.page_size.into());
        serde_json::Value::Object(variables)
    }
}

fn is_criterion(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Text(text) => !text.is_empty(),
        Value::List(items) => !items.is_empty(),
        Value::Record(fields) => fields.values().any(is_criterion),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

fn criteria(filter: &Record) -> Record {
    filter
        .iter()
        .filter(|(_, value)| is_criterion(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
