//! Crawl frontier
//!
//! A FIFO queue of URLs waiting to be fetched plus the set of URLs already
//! attempted. The queue may hold duplicates and already-visited URLs; they are
//! skipped at dequeue time, so a URL is handed out at most once per run.

use std::collections::{HashSet, VecDeque};

/// Breadth-first frontier with a visited set
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    /// URLs waiting to be attempted, in discovery order
    queue: VecDeque<String>,

    /// URLs already handed out (including those restored from a checkpoint)
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier that already considers `visited` attempted
    pub fn new(visited: HashSet<String>) -> Self {
        Self {
            queue: VecDeque::new(),
            visited,
        }
    }

    /// Appends a URL to the back of the queue
    pub fn push(&mut self, url: impl Into<String>) {
        self.queue.push_back(url.into());
    }

    /// Appends every URL, in order
    pub fn extend<I>(&mut self, urls: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.queue.extend(urls);
    }

    /// Pops URLs until one has not been visited, marks it visited and returns it
    ///
    /// Returns None once the queue is drained.
    pub fn next_unvisited(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            if self.visited.contains(&url) {
                tracing::trace!("Skipping already visited {}", url);
                continue;
            }
            self.visited.insert(url.clone());
            return Some(url);
        }
        None
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Queued URLs that still need fetching, in queue order
    pub fn pending(&self) -> impl Iterator<Item = &String> {
        self.queue.iter().filter(|url| !self.visited.contains(*url))
    }

    /// Number of queued entries, including ones that will be skipped
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}
