use crate::segmenter::{SegmentationError, Segmenter};
use hashbrown::HashMap;
use std::sync::Arc;

/// Resolves named segmentation services into shared handles.
pub trait CapabilityProvider: Send + Sync {
    fn segmenter(&self, name: &str) -> Result<Arc<dyn Segmenter>, SegmentationError>;
}

/// Provider backed by a fixed name → handle table.
#[derive(Default, Clone)]
pub struct StaticProvider {
    segmenters: HashMap<String, Arc<dyn Segmenter>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_segmenter(
        mut self,
        name: impl Into<String>,
        segmenter: Arc<dyn Segmenter>,
    ) -> Self {
        self.segmenters.insert(name.into(), segmenter);
        self
    }
}

impl CapabilityProvider for StaticProvider {
    fn segmenter(&self, name: &str) -> Result<Arc<dyn Segmenter>, SegmentationError> {
        self.segmenters.get(name).cloned().ok_or_else(|| {
            SegmentationError::Unavailable(format!("no segmentation service named {name:?}"))
        })
    }
}
