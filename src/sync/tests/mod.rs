//! Unit tests for the sync module.
//!
//! Tests are organised by component: event resolution, the task store, and
//! the reconciler driven by in-memory and mocked fetchers.
