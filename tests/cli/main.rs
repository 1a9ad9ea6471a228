//! Integration tests for the `cli` module, one file per concern.

mod engine;
