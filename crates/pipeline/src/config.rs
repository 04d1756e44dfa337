use crate::segmenter::SegmentationOptions;
use segviz_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which source to segment and which service segments it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Source identifier handed to the segmentation service.
    #[serde(default)]
    pub camera_name: String,

    #[serde(default)]
    pub vision_service_name: String,

    /// Per-frame deadline for the segmentation call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "SegmentationOptions::is_empty")]
    pub segmentation_options: SegmentationOptions,
}

impl VisualizerConfig {
    pub fn new(camera_name: impl Into<String>, vision_service_name: impl Into<String>) -> Self {
        Self {
            camera_name: camera_name.into(),
            vision_service_name: vision_service_name.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidArgument(format!("malformed visualizer config: {e}")))
    }

    /// Checks required fields and returns the dependency names to acquire.
    pub fn validate(&self) -> Result<Vec<String>> {
        if self.camera_name.is_empty() {
            return Err(Error::InvalidArgument(
                "expected \"camera_name\" attribute".into(),
            ));
        }
        if self.vision_service_name.is_empty() {
            return Err(Error::InvalidArgument(
                "expected \"vision_service_name\" attribute".into(),
            ));
        }
        if self.deadline_ms == Some(0) {
            return Err(Error::InvalidArgument(
                "\"deadline_ms\" must be positive".into(),
            ));
        }
        Ok(vec![
            self.camera_name.clone(),
            self.vision_service_name.clone(),
        ])
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}
