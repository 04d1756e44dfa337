use segviz_core::{PointCloud, PointXYZRGBA, Result, Stage};

/// Accumulates colored clusters into one cloud.
///
/// Clusters are applied in iteration order; when two points share a
/// coordinate the later one wins. Any rejected write aborts the merge and
/// the partial cloud is dropped.
pub fn merge<I>(colored: I) -> Result<PointCloud>
where
    I: IntoIterator,
    I::Item: AsRef<[PointXYZRGBA]>,
{
    let colored: Vec<I::Item> = colored.into_iter().collect();
    let total = colored.iter().map(|points| points.as_ref().len()).sum();

    let mut merged = PointCloud::with_capacity(total);
    for points in &colored {
        for p in points.as_ref() {
            merged
                .set(p.position(), p.color)
                .map_err(|e| e.in_stage(Stage::Merge))?;
        }
    }
    Ok(merged)
}
