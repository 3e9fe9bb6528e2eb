//! Data models for the application
//!
//! `storage` describes what a backend reports about an object, `media` the
//! registry's descriptive records, and `responses` the shapes returned by
//! service operations.

mod media;
mod responses;
mod storage;

pub use media::*;
pub use responses::*;
pub use storage::*;
