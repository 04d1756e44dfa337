use segviz_core::{Error, PointCloud, PointXYZRGBA, Result, Rgba};

/// Averages one channel, truncating toward zero.
#[inline]
pub fn blend_channel(original: u8, overlay: u8) -> u8 {
    ((u16::from(original) + u16::from(overlay)) / 2) as u8
}

/// Blends RGB with the overlay; alpha passes through unchanged.
#[inline]
pub fn blend(original: Rgba, overlay: [u8; 3]) -> Rgba {
    Rgba::new(
        blend_channel(original.r, overlay[0]),
        blend_channel(original.g, overlay[1]),
        blend_channel(original.b, overlay[2]),
        original.a,
    )
}

/// Blends every point of `cluster` with `overlay`.
///
/// Emits exactly one point per input point, in cluster order. Fails with
/// `UnsupportedColorFormat` if the cluster carries no color data.
pub fn colorize(cluster: &PointCloud, overlay: [u8; 3]) -> Result<Vec<PointXYZRGBA>> {
    let mut out = Vec::with_capacity(cluster.len());
    let mut missing = None;

    cluster.iterate(0, 0, |position, color| match color {
        Some(color) => {
            out.push(PointXYZRGBA::new(position, blend(color, overlay)));
            true
        }
        None => {
            missing = Some(out.len());
            false
        }
    });

    if let Some(i) = missing {
        return Err(Error::UnsupportedColorFormat(format!(
            "point {i} has no RGB color data"
        )));
    }
    Ok(out)
}
