//! rusty-forum/crates/rf-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Rusty-Forum.

pub mod error;
pub mod models;
pub mod raw;
pub mod thread_detail;
pub mod traits;
pub mod use_cases;
pub mod views;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use raw::*;
pub use thread_detail::*;
pub use traits::*;
pub use use_cases::*;
pub use views::*;
