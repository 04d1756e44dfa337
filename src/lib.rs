pub use segviz_core as core;
pub use segviz_overlay as overlay;
pub use segviz_palette as palette;
pub use segviz_pipeline as pipeline;

pub use segviz_core::{Error, ErrorKind, PointCloud, Result, Rgba};
pub use segviz_overlay::{colorize, merge, overlay_clusters, overlay_frame};
pub use segviz_palette::generate_palette;
pub use segviz_pipeline::{Segmenter, Visualizer, VisualizerConfig};
