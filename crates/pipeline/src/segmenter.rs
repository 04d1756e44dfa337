use async_trait::async_trait;
use segviz_core::PointCloud;
use std::time::Duration;

/// Free-form options forwarded verbatim to the segmentation service.
pub type SegmentationOptions = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("segmentation service unavailable: {0}")]
    Unavailable(String),

    #[error("segmentation timed out after {0:?}")]
    Timeout(Duration),
}

/// Object segmentation capability.
///
/// Implementations must be thread-safe (Send + Sync); one handle is shared
/// by every frame request of a visualizer.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Segments the latest capture of `source_id` into per-object clusters.
    ///
    /// Clusters are expected to carry RGB color data.
    async fn object_clusters(
        &self,
        source_id: &str,
        options: &SegmentationOptions,
    ) -> Result<Vec<PointCloud>, SegmentationError>;

    /// Releases the underlying service handle.
    async fn close(&self) -> Result<(), SegmentationError> {
        Ok(())
    }
}
