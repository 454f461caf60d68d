//! Aggregator tests against the fixture store.

mod aggregate_search;
