//! Frame driver around the segmentation capability.
//!
//! A [`Visualizer`] asks its [`Segmenter`] for the current object clusters of
//! one source, then hands them to `segviz_overlay` to build the merged,
//! color-annotated cloud. The segmentation call is the only await point and
//! the only place cancellation and deadlines apply.

#![forbid(unsafe_code)]

pub mod config;
pub mod provider;
pub mod segmenter;
pub mod visualizer;

pub use config::VisualizerConfig;
pub use futures::future::{AbortHandle, AbortRegistration};
pub use provider::{CapabilityProvider, StaticProvider};
pub use segmenter::{SegmentationError, SegmentationOptions, Segmenter};
pub use visualizer::Visualizer;
