//! Traversal state definitions for the two-level archive crawl
//!
//! The crawl starts at the root listing, moves into event listings, and
//! recurses between event listings. Downloads branch off event listings.

use std::fmt;

/// Where a queued listing sits in the traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalState {
    /// The top-level listing of all events
    AtRoot,

    /// An event listing (or a nested directory below one)
    AtEventListing,
}

impl TraversalState {
    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// The root is only ever the starting point; nothing transitions back
    /// into it.
    pub fn can_transition_to(&self, next: TraversalState) -> bool {
        matches!(next, Self::AtEventListing)
    }
}

impl fmt::Display for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtRoot => write!(f, "root"),
            Self::AtEventListing => write!(f, "event-listing"),
        }
    }
}
