//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TraversalState`: which kind of listing a queued request points at
//! - `EventRecord`: files saved for one event during the run

mod event_record;
mod traversal_state;

// Re-export main types
pub use event_record::EventRecord;
pub use traversal_state::TraversalState;
