//! Repository implementations for the activity tables.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`,
//! so callers decide the transaction boundary.

pub mod activity;
pub mod file;
pub mod tag;

pub use activity::{ActivityRepo, ActivityRow, NewActivity};
pub use file::FileRepo;
pub use tag::TagRepo;
