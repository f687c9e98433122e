use super::*;
use futures::StreamExt;
use futures::executor::block_on;
use std::thread;
use std::time::{Duration, Instant};

use crate::value::{Record, Value};

fn options() -> FilterOptions {
    FilterOptions {
        ordering: Some(SortOrder::asc("name")),
        page: 1,
        page_size: 25,
        debounce_ms: 200,
    }
}

fn search(text: &str) -> Record {
    Value::record([("search", Value::from(text))])
        .as_record()
        .cloned()
        .expect("record value")
}

fn state_on_page(page: usize) -> FilterState {
    let state = FilterState::new(search(""), &options());
    reduce(&state, FilterAction::SetPage(page))
}

#[test]
fn changing_criteria_returns_to_first_page() {
    let state = state_on_page(4);
    assert_eq!(state.page, 4);

    let actions = [
        FilterAction::SetFilterField {
            key: "search".into(),
            value: "abc".into(),
        },
        FilterAction::SetFilter {
            filter: search("x"),
            update_initial: false,
        },
        FilterAction::ResetFilter,
        FilterAction::SetOrdering(Some(SortOrder::dsc("created"))),
        FilterAction::SortBy("name".into()),
        FilterAction::SetPageSize(50),
    ];
    for action in actions {
        let next = reduce(&state, action.clone());
        assert_eq!(next.page, 1, "{action:?} should reset the page");
    }

    let next = reduce(&state, FilterAction::SetPage(7));
    assert_eq!(next.page, 7);
    assert_eq!(next.filter, state.filter);
}

#[test]
fn page_and_page_size_stay_positive() {
    let state = state_on_page(3);
    assert_eq!(reduce(&state, FilterAction::SetPage(0)).page, 1);
    let resized = reduce(&state, FilterAction::SetPageSize(0));
    assert_eq!(resized.page_size, 1);

    let options = FilterOptions {
        page: 0,
        page_size: 0,
        ..FilterOptions::default()
    };
    let state = FilterState::new(Record::new(), &options);
    assert_eq!((state.page, state.page_size), (1, 1));
}

#[test]
fn reduce_leaves_input_state_untouched() {
    let state = state_on_page(2);
    let before = state.clone();
    let _ = reduce(
        &state,
        FilterAction::SetFilterField {
            key: "status".into(),
            value: "open".into(),
        },
    );
    assert_eq!(state, before);
}

#[test]
fn reset_restores_initial_filter_and_update_initial_moves_baseline() {
    let state = FilterState::new(search("a"), &options());
    let state = reduce(
        &state,
        FilterAction::SetFilterField {
            key: "search".into(),
            value: "b".into(),
        },
    );
    assert!(state.is_filter_changed());

    let reset = reduce(&state, FilterAction::ResetFilter);
    assert_eq!(reset.filter, search("a"));
    assert!(!reset.is_filter_changed());

    let rebased = reduce(
        &state,
        FilterAction::SetFilter {
            filter: search("c"),
            update_initial: true,
        },
    );
    assert_eq!(rebased.initial_filter, search("c"));
    let reset = reduce(&rebased, FilterAction::ResetFilter);
    assert_eq!(reset.filter, search("c"));
}

#[test]
fn ordering_param_uses_minus_prefix_for_descending() {
    let state = FilterState::new(Record::new(), &options());
    assert_eq!(state.ordering_param().as_deref(), Some("name"));

    let state = reduce(
        &state,
        FilterAction::SetOrdering(Some(SortOrder::dsc("created_at"))),
    );
    assert_eq!(state.ordering_param().as_deref(), Some("-created_at"));

    let state = reduce(&state, FilterAction::SetOrdering(None));
    assert_eq!(state.ordering_param(), None);
}

#[test]
fn sort_by_toggles_same_column_and_starts_new_column_ascending() {
    let state = FilterState::new(Record::new(), &options());
    let state = reduce(&state, FilterAction::SortBy("name".into()));
    assert_eq!(state.ordering, Some(SortOrder::dsc("name")));
    let state = reduce(&state, FilterAction::SortBy("name".into()));
    assert_eq!(state.ordering, Some(SortOrder::asc("name")));
    let state = reduce(&state, FilterAction::SortBy("email".into()));
    assert_eq!(state.ordering, Some(SortOrder::asc("email")));
}

#[test]
fn sort_order_parses_and_serializes() {
    let order: SortOrder = "-email".parse().expect("descending");
    assert_eq!(order, SortOrder::dsc("email"));
    assert_eq!("email".parse::<SortOrder>(), Ok(SortOrder::asc("email")));
    assert!("-".parse::<SortOrder>().is_err());
    assert!("".parse::<SortOrder>().is_err());

    let json = serde_json::to_value(SortOrder::dsc("email")).expect("serialize");
    assert_eq!(json, serde_json::json!({ "name": "email", "direction": "dsc" }));
}

#[test]
fn blank_criteria_do_not_count_as_filtered() {
    let blank = Value::record([
        ("search", Value::from("")),
        ("status", Value::Null),
        ("tags", Value::List(Default::default())),
        ("range", Value::record([("from", Value::Null)])),
    ]);
    let blank = blank.as_record().cloned().expect("record value");
    let state = FilterState::new(blank.clone(), &options());
    assert!(!state.is_filtered());

    let state = reduce(
        &state,
        FilterAction::SetFilterField {
            key: "archived".into(),
            value: false.into(),
        },
    );
    assert!(state.is_filtered());
    assert!(state.is_filter_changed());

    let state = reduce(
        &state,
        FilterAction::SetFilterField {
            key: "archived".into(),
            value: Value::Null,
        },
    );
    assert!(!state.is_filter_changed());
}

#[test]
fn query_offset_and_variables() {
    let state = FilterState::new(search("abc"), &options());
    let state = reduce(&state, FilterAction::SetPage(3));
    let query = state.query();
    assert_eq!(query.offset(), 50);
    assert_eq!(
        query.variables(),
        serde_json::json!({
            "search": "abc",
            "ordering": "name",
            "page": 3,
            "pageSize": 25,
        })
    );

    let unfiltered = FilterState::new(search(""), &FilterOptions::default()).query();
    assert_eq!(
        unfiltered.variables(),
        serde_json::json!({ "page": 1, "pageSize": 10 })
    );
}

#[test]
fn offset_of_hand_built_query_saturates_at_zero() {
    let query = FilterQuery {
        filter: Record::new(),
        ordering: None,
        page: 0,
        page_size: 25,
    };
    assert_eq!(query.offset(), 0);
}

#[test]
fn debouncer_publishes_only_after_quiet_window() {
    let start = Instant::now();
    let window = Duration::from_millis(100);
    let mut debouncer = Debouncer::new(0, window);

    debouncer.schedule(1, start);
    debouncer.schedule(2, start + Duration::from_millis(60));
    assert_eq!(debouncer.poll(start + Duration::from_millis(120)), None);
    assert_eq!(debouncer.published(), &0);
    assert_eq!(
        debouncer.deadline(),
        Some(start + Duration::from_millis(160))
    );

    assert_eq!(debouncer.poll(start + Duration::from_millis(160)), Some(&2));
    assert_eq!(debouncer.version(), 1);
    assert!(!debouncer.is_pending());
}

#[test]
fn debouncer_skips_publication_of_unchanged_value() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new("a", Duration::from_millis(10));
    debouncer.schedule("b", start);
    debouncer.schedule("a", start);
    assert_eq!(debouncer.poll(start + Duration::from_millis(10)), None);
    assert_eq!(debouncer.version(), 0);

    debouncer.schedule("c", start);
    assert!(debouncer.cancel());
    assert_eq!(debouncer.flush(), None);
    assert_eq!(debouncer.published(), &"a");
}

#[test]
fn burst_of_actions_publishes_last_query_once() {
    let start = Instant::now();
    let mut filter = DebouncedFilter::new(search(""), &options());
    for (step, text) in ["a", "ab", "abc"].into_iter().enumerate() {
        filter.dispatch_at(
            FilterAction::SetFilterField {
                key: "search".into(),
                value: text.into(),
            },
            start + Duration::from_millis(50 * step as u64),
        );
        assert_eq!(filter.state().filter, search(text));
        assert_eq!(filter.query().filter, search(""));
    }

    assert_eq!(filter.tick(start + Duration::from_millis(250)), None);
    let published = filter
        .tick(start + Duration::from_millis(300))
        .expect("published after quiet window");
    assert_eq!(published.filter, search("abc"));
    assert_eq!(filter.version(), 1);
    assert_eq!(filter.tick(start + Duration::from_millis(900)), None);
}

#[test]
fn handle_updates_raw_state_immediately_and_query_after_flush() {
    let handle = FilterHandle::new(search(""), options());
    handle.set_page(3);
    handle.set_filter_field("report", "search");

    assert_eq!(handle.raw_filter(), search("report"));
    assert_eq!(handle.raw_state().page, 1);
    assert!(handle.is_filtered());
    assert!(handle.is_pending());
    assert_eq!(handle.filter(), search(""));

    let published = handle.flush().expect("pending query");
    assert_eq!(published.filter, search("report"));
    assert_eq!(handle.page(), 1);
    assert_eq!(handle.page_size(), 25);
    assert_eq!(handle.ordering().as_deref(), Some("name"));

    handle.set_filter_with(
        |previous| previous.update("status".to_owned(), Value::from("open")),
        false,
    );
    handle.set_ordering_with(|current| current.cloned().map(SortOrder::toggled));
    assert_eq!(handle.raw_ordering(), Some(SortOrder::dsc("name")));
    assert_eq!(handle.raw_filter().get("status"), Some(&Value::from("open")));
    assert_eq!(handle.initial_filter(), search(""));

    handle.reset_filter();
    assert!(!handle.is_filter_changed());
}

#[test]
fn changes_stream_yields_settled_query_and_ends_on_drop() {
    let handle = FilterHandle::new(
        search(""),
        FilterOptions {
            debounce_ms: 30,
            ..options()
        },
    );
    let mut changes = handle.changes();

    handle.set_filter_field("a", "search");
    handle.sort_by("email");
    handle.set_filter_field("ab", "search");

    let started = Instant::now();
    let first = block_on(changes.next()).expect("one publication");
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(first.filter, search("ab"));
    assert_eq!(first.ordering.as_deref(), Some("email"));
    assert_eq!(handle.query(), first);

    drop(handle);
    assert!(block_on(changes.next()).is_none());
}

#[test]
fn changes_stream_wakes_for_updates_from_another_thread() {
    let handle = std::sync::Arc::new(FilterHandle::new(
        Record::new(),
        FilterOptions {
            debounce_ms: 10,
            ..FilterOptions::default()
        },
    ));
    let mut changes = handle.changes();

    let writer = {
        let handle = handle.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            handle.set_page(4);
        })
    };

    let query = block_on(changes.next()).expect("publication");
    writer.join().expect("writer thread joins");
    assert_eq!(query.page, 4);
}

#[test]
fn filter_options_deserialize_with_defaults() {
    let options: FilterOptions = serde_json::from_str(
        r#"{ "ordering": { "name": "created", "direction": "dsc" }, "debounce_ms": 50 }"#,
    )
    .expect("options");
    assert_eq!(options.ordering, Some(SortOrder::dsc("created")));
    assert_eq!(options.page, 1);
    assert_eq!(options.page_size, 10);
    assert_eq!(options.debounce(), Duration::from_millis(50));
}
