//! Frontier of pending listing fetches and downloads
//!
//! This module handles:
//! - FIFO ordering of queued requests
//! - A run-wide visited set so no URL is requested twice
//! - The depth bound on nested listings

use crate::state::TraversalState;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// What a queued request is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Fetch and parse a listing page
    Listing {
        /// Traversal state the page is processed in
        state: TraversalState,
        /// Nesting below the root (root = 0)
        depth: u32,
    },

    /// Download a file for an event
    Download {
        /// Event the file belongs to
        event: String,
    },
}

/// A request waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedRequest {
    /// The URL to fetch
    pub url: Url,

    /// What to do with the response
    pub kind: RequestKind,
}

/// Why a request was not queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// The URL was already queued earlier in the run
    AlreadyVisited,
    /// The listing would be nested deeper than allowed
    DepthExceeded,
}

/// Frontier manages the queue of pending requests
pub struct Frontier {
    /// Pending requests, oldest first
    queue: VecDeque<QueuedRequest>,

    /// Every URL ever queued (fragment-free string form)
    visited: HashSet<String>,

    /// Maximum listing depth
    max_depth: u32,
}

impl Frontier {
    /// Creates a frontier seeded with the root listing
    pub fn new(root: Url, max_depth: u32) -> Self {
        let mut frontier = Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
        };
        // the root is never a duplicate nor too deep
        let _ = frontier.push(QueuedRequest {
            url: root,
            kind: RequestKind::Listing {
                state: TraversalState::AtRoot,
                depth: 0,
            },
        });
        frontier
    }

    /// Queues a request unless its URL was seen or it is too deep
    pub fn push(&mut self, request: QueuedRequest) -> Result<(), Rejected> {
        if let RequestKind::Listing { depth, .. } = request.kind {
            if depth > self.max_depth {
                return Err(Rejected::DepthExceeded);
            }
        }

        if !self.visited.insert(visit_key(&request.url)) {
            return Err(Rejected::AlreadyVisited);
        }

        self.queue.push_back(request);
        Ok(())
    }

    /// Takes the next request, oldest first
    pub fn pop(&mut self) -> Option<QueuedRequest> {
        self.queue.pop_front()
    }

    /// Number of pending requests
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs queued during the run
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

fn visit_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}
