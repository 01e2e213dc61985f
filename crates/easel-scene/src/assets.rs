//! Asset resolution seam.
//!
//! Image and video nodes need the asset's intrinsic pixel size before they
//! can enter the scene. Loading is the only asynchronous boundary in the
//! engine; it is modeled as a polled queue: the sync engine re-polls
//! pending sources once per reconciliation pass, and a completion whose
//! element has since been deleted is dropped silently.

use easel_core::Dimensions;
use std::collections::HashMap;

/// Outcome of polling one asset source.
pub type AssetPoll = Option<Result<Dimensions, String>>;

/// External collaborator resolving a source reference to a loaded asset
/// with known intrinsic dimensions. `None` means still loading.
pub trait AssetSource {
    fn poll(&mut self, src: &str) -> AssetPoll;
}

/// In-memory asset table resolving on the first poll. Sources not present
/// in the table fail with a not-found reason.
#[derive(Debug, Default)]
pub struct StaticAssets {
    entries: HashMap<String, Result<Dimensions, String>>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, src: impl Into<String>, size: Dimensions) -> &mut Self {
        self.entries.insert(src.into(), Ok(size));
        self
    }

    /// Register a source that fails to load.
    pub fn insert_broken(&mut self, src: impl Into<String>, reason: impl Into<String>) -> &mut Self {
        self.entries.insert(src.into(), Err(reason.into()));
        self
    }
}

impl AssetSource for StaticAssets {
    fn poll(&mut self, src: &str) -> AssetPoll {
        Some(
            self.entries
                .get(src)
                .cloned()
                .unwrap_or_else(|| Err(format!("asset not found: {src}"))),
        )
    }
}

/// Wraps [`StaticAssets`] but stays pending for a fixed number of polls
/// per source, simulating in-flight loads.
#[derive(Debug)]
pub struct DeferredAssets {
    inner: StaticAssets,
    delay: usize,
    polled: HashMap<String, usize>,
}

impl DeferredAssets {
    pub fn new(inner: StaticAssets, delay: usize) -> Self {
        Self {
            inner,
            delay,
            polled: HashMap::new(),
        }
    }
}

impl AssetSource for DeferredAssets {
    fn poll(&mut self, src: &str) -> AssetPoll {
        let count = self.polled.entry(src.to_string()).or_insert(0);
        if *count < self.delay {
            *count += 1;
            return None;
        }
        self.inner.poll(src)
    }
}
