//! WAL test suite
//!
//! - entry_tests: record construction and size accounting
//! - writer_tests: appending and sync strategies
//! - reader_tests: sequential replay and end-of-stream handling

mod entry_tests;
mod reader_tests;
