//! Feature map: a binned overview of the whole document.
//!
//! The document range is split into equal bins. Each bin carries the
//! Shannon entropy of its bytes and the fraction covered by function code,
//! which is enough to draw a minimap and to jump to a region by clicking it.

use serde::{Deserialize, Serialize};

use crate::config::FeatureMapConfig;
use crate::core::OffsetRange;
use crate::document::Document;

/// Calculates the Shannon entropy of a byte slice.
///
/// Returns a value between 0.0 (all bytes equal) and 8.0 (uniform).
#[inline]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut histogram = [0usize; 256];
    for &byte in data {
        histogram[byte as usize] += 1;
    }

    let len = data.len() as f64;
    let mut entropy = 0.0;
    for &count in &histogram {
        if count == 0 {
            continue;
        }
        let p = (count as f64) / len;
        entropy -= p * p.log2();
    }
    entropy
}

/// One bin of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBin {
    pub range: OffsetRange,
    /// Bits per byte
    pub entropy: f64,
    /// Share of the bin covered by function basic blocks, 0.0..=1.0
    pub code_fraction: f64,
    pub high_entropy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMap {
    data_type: String,
    bins: Vec<FeatureBin>,
}

impl FeatureMap {
    /// Build the map for `document`.
    pub fn build(document: &dyn Document, config: &FeatureMapConfig) -> Self {
        let start = document.start();
        let len = document.len();
        let count = (config.bins.max(1) as u64).min(len.max(1));
        let width = len.div_ceil(count).max(1);

        let code: Vec<OffsetRange> = document
            .functions()
            .iter()
            .flat_map(|f| f.basic_blocks.iter().map(|b| b.range()))
            .collect();

        let mut bins = Vec::new();
        let mut pos = start;
        while pos < document.end() {
            let end = pos.saturating_add(width).min(document.end());
            let range = OffsetRange::new(pos, end);
            let bytes = document.read(pos, (end - pos) as usize);
            let entropy = shannon_entropy(&bytes);
            let covered: u64 = code
                .iter()
                .filter(|r| r.overlaps(&range))
                .map(|r| r.end.min(end) - r.start.max(pos))
                .sum();
            bins.push(FeatureBin {
                range,
                entropy,
                code_fraction: (covered.min(range.len()) as f64) / (range.len() as f64),
                high_entropy: entropy >= config.high_entropy,
            });
            pos = end;
        }

        tracing::debug!(bins = bins.len(), width, "built feature map");
        Self {
            data_type: document.data_type().to_string(),
            bins,
        }
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn bins(&self) -> &[FeatureBin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Index of the bin containing `offset`.
    pub fn bin_at(&self, offset: u64) -> Option<usize> {
        self.bins.iter().position(|b| b.range.contains(offset))
    }

    /// Offset a click on bin `index` navigates to.
    pub fn offset_for_bin(&self, index: usize) -> Option<u64> {
        self.bins.get(index).map(|b| b.range.start)
    }

    pub fn high_entropy_bins(&self) -> Vec<usize> {
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, b)| b.high_entropy)
            .map(|(i, _)| i)
            .collect()
    }
}
