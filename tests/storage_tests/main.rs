//! Storage backend test suite
//!
//! Both backends must honour the same contract:
//! - open_stream hands out a fresh writable/readable stream per (namespace, id)
//! - list_stream_ids enumerates a namespace
