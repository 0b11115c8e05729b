//! Data models exposed by the API.
//!
//! Users live in the document store; buckets and objects are descriptors of
//! what the object-storage service holds. All of them serialize as JSON via
//! `serde`.

pub mod bucket;
pub mod object;
pub mod user;
