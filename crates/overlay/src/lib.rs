#![forbid(unsafe_code)]

pub mod colorize;
pub mod merge;

pub use colorize::{blend, blend_channel, colorize};
pub use merge::merge;

use rayon::prelude::*;
use segviz_core::{Error, PointCloud, PointXYZRGBA, Result, Stage};
use tracing::debug;

/// Total point count above which clusters are colorized in parallel.
const PARALLEL_POINT_THRESHOLD: usize = 10_000;

/// Colorizes each cluster with its palette entry and merges the results
/// in cluster order.
pub fn overlay_clusters(clusters: &[PointCloud], palette: &[[u8; 3]]) -> Result<PointCloud> {
    if clusters.len() != palette.len() {
        return Err(Error::InvalidArgument(format!(
            "{} clusters but {} palette colors",
            clusters.len(),
            palette.len()
        ))
        .in_stage(Stage::Palette));
    }

    let total_points: usize = clusters.iter().map(PointCloud::len).sum();
    let colorize_one = |(i, (cluster, overlay)): (usize, (&PointCloud, &[u8; 3]))| {
        colorize(cluster, *overlay).map_err(|e| e.in_stage(Stage::Colorize { cluster: i }))
    };

    // Order is preserved either way; merge relies on it for collisions.
    let colored: Vec<Vec<PointXYZRGBA>> = if total_points >= PARALLEL_POINT_THRESHOLD {
        clusters
            .par_iter()
            .zip(palette.par_iter())
            .enumerate()
            .map(colorize_one)
            .collect::<Result<_>>()?
    } else {
        clusters
            .iter()
            .zip(palette)
            .enumerate()
            .map(colorize_one)
            .collect::<Result<_>>()?
    };

    let merged = merge(&colored)?;
    debug!(
        clusters = clusters.len(),
        input_points = total_points,
        merged_points = merged.len(),
        "overlaid segmentation clusters"
    );
    Ok(merged)
}

/// Generates a fresh palette for `clusters` and overlays them.
pub fn overlay_frame(clusters: &[PointCloud]) -> Result<PointCloud> {
    let palette = segviz_palette::generate_palette(clusters.len());
    overlay_clusters(clusters, &palette)
}

/// [`overlay_frame`] with a reproducible palette.
pub fn overlay_frame_seeded(clusters: &[PointCloud], seed: u64) -> Result<PointCloud> {
    let palette = segviz_palette::generate_palette_seeded(clusters.len(), seed);
    overlay_clusters(clusters, &palette)
}
