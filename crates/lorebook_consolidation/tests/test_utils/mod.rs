//! Test utilities for consolidation tests.
//!
//! This module provides a scripted driver and a few text helpers.

pub mod mock_driver;

#[allow(unused_imports)]
pub use mock_driver::{MockBehavior, MockDriver, MockResponse};

use std::sync::{Arc, Mutex};

/// Progress reports captured from a run.
#[allow(dead_code)]
#[derive(Debug, Clone, Default)]
pub struct ProgressLog(Arc<Mutex<Vec<(u8, String)>>>);

#[allow(dead_code)]
impl ProgressLog {
    /// Callback that appends to this log.
    pub fn callback(&self) -> impl Fn(u8, &str) + '_ {
        move |percent: u8, status: &str| self.0.lock().unwrap().push((percent, status.to_string()))
    }

    /// Every report so far.
    pub fn entries(&self) -> Vec<(u8, String)> {
        self.0.lock().unwrap().clone()
    }
}

/// A document that splits into `chunks` chunks of `chunk_size` characters.
#[allow(dead_code)]
pub fn document(chunks: usize, chunk_size: usize) -> String {
    (0..chunks)
        .map(|i| char::from(b'a' + (i % 26) as u8).to_string().repeat(chunk_size))
        .collect()
}
