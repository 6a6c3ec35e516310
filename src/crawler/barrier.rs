//! Per-depth layer barrier
//!
//! Layers are indexed by *remaining* depth: the seed lives in layer `depth`,
//! its children in `depth - 1`, and so on down to layer 1 (the leaves).
//! A page in layer `d` waits for layer `d + 1` to drain before it proceeds
//! past its download, so a whole BFS layer has registered its children before
//! any of those children can finish.
//!
//! Layer counters are created on first entry, so memory follows the layers a
//! crawl actually reaches rather than the requested depth.

use crate::crawler::counter::WorkCounter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug)]
pub struct LayerBarrier {
    depth: u32,
    layers: Mutex<HashMap<u32, Arc<WorkCounter>>>,
}

impl LayerBarrier {
    /// Creates a barrier over layers `1..=depth`
    pub fn new(depth: u32) -> Self {
        Self {
            depth,
            layers: Mutex::new(HashMap::new()),
        }
    }

    fn in_range(&self, depth: u32) -> bool {
        (1..=self.depth).contains(&depth)
    }

    fn layer(&self, depth: u32) -> Option<Arc<WorkCounter>> {
        self.layers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&depth)
            .cloned()
    }

    /// Registers a page claimed at remaining depth `depth`
    pub fn enter(&self, depth: u32) {
        if !self.in_range(depth) {
            return;
        }
        self.layers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(depth)
            .or_insert_with(|| Arc::new(WorkCounter::new(0)))
            .register();
    }

    /// Marks a page of layer `depth` terminal
    pub fn leave(&self, depth: u32) {
        if let Some(layer) = self.layer(depth) {
            layer.arrive();
        }
    }

    /// Pages of layer `depth` that are not yet terminal
    pub fn in_flight(&self, depth: u32) -> usize {
        self.layer(depth).map_or(0, |layer| layer.pending())
    }

    /// Waits until every page of the layer above `depth` is terminal
    ///
    /// Layers that were never entered, and the seed's parent, are always
    /// drained.
    pub async fn wait_parent_drained(&self, depth: u32) {
        let Some(parent) = depth.checked_add(1) else {
            return;
        };
        self.wait_drained(parent).await;
    }

    /// Waits until every page of layer `depth` is terminal
    pub async fn wait_drained(&self, depth: u32) {
        if let Some(layer) = self.layer(depth) {
            layer.wait_idle().await;
        }
    }
}
