//! State module for tracking page lifecycle
//!
//! A page is either pending (known but not yet fetched) or fetched, in which
//! case its content, digest and timestamp travel together.

mod page_state;

// Re-export main types
pub use page_state::{FetchedContent, PageState, PageStatus, PartialRecord};
