use async_trait::async_trait;
use segviz::core::{Colors, PointCloud};
use segviz::pipeline::{
    SegmentationError, SegmentationOptions, Segmenter, StaticProvider, Visualizer, VisualizerConfig,
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Stands in for a remote segmentation service: returns three fixed objects.
struct CannedSegmenter;

#[async_trait]
impl Segmenter for CannedSegmenter {
    async fn object_clusters(
        &self,
        _source_id: &str,
        _options: &SegmentationOptions,
    ) -> Result<Vec<PointCloud>, SegmentationError> {
        Ok((0..3).map(|k| box_cluster(k as f32 * 2.0, 200)).collect())
    }
}

fn box_cluster(offset: f32, n: usize) -> PointCloud {
    let x: Vec<f32> = (0..n).map(|i| offset + (i as f32 * 0.731) % 1.0).collect();
    let y: Vec<f32> = (0..n).map(|i| (i as f32 * 0.419) % 1.0).collect();
    let z: Vec<f32> = (0..n).map(|i| (i as f32 * 0.257) % 1.0).collect();
    let gray: Vec<u8> = (0..n).map(|i| (i % 256) as u8).collect();
    PointCloud::from_xyzrgb(x, y, z, Colors::from_rgb(gray.clone(), gray.clone(), gray))
}

#[tokio::main]
async fn main() -> segviz::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,segviz_overlay=debug,segviz_pipeline=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = VisualizerConfig::from_json_str(
        r#"{"camera_name": "depth-cam", "vision_service_name": "segmenter", "deadline_ms": 500}"#,
    )?;
    let provider = StaticProvider::new().with_segmenter("segmenter", Arc::new(CannedSegmenter));
    let viz = Visualizer::from_provider(config, &provider)?;

    let merged = viz.next_point_cloud().await?;
    println!("Merged cloud: {} points", merged.len());
    for p in merged.iter_colored().take(5) {
        println!(
            "  ({:.3}, {:.3}, {:.3}) -> rgb({}, {}, {})",
            p.x, p.y, p.z, p.color.r, p.color.g, p.color.b
        );
    }

    viz.close().await
}
