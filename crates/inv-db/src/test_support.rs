//! Shared test utilities for inv-db unit tests.
