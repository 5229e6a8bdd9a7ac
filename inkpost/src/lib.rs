//! Expose inkpost's internal API for use in integration tests. It is not meant
//! as a stable library interface; use `inkpost-markdown` for that.
pub mod build;
pub mod cli;
