//! Pagination module
//!
//! One page of a collection query is described by a [`PageRequest`] and
//! answered with a [`Page`]: the decoded records plus the token that resumes
//! the query after the last of them.
//!
//! # Overview
//!
//! The token is taken from the last record of a page: its cursor-field
//! timestamp when a cursor field is configured, otherwise its document
//! name. An empty page carries no token, which ends the drain.

mod types;

pub use types::{Page, PageFetcher, PageRequest, PageToken, Record};
