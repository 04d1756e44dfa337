use crate::{Error, PointXYZRGBA, Result, Rgba};
use hashbrown::HashMap;

/// Structure-of-arrays point cloud keyed by exact coordinate.
///
/// Points written through [`PointCloud::set`] are unique per coordinate: a
/// second write to the same coordinate overwrites the color in place and
/// keeps the original slot. The `from_*` builders take upstream data as is
/// and do not deduplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    x: Vec<f32>,
    y: Vec<f32>,
    z: Vec<f32>,
    colors: Option<Colors>,
    index: HashMap<CoordKey, usize>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
    pub a: Option<Vec<u8>>,
}

impl Colors {
    pub fn from_rgb(r: Vec<u8>, g: Vec<u8>, b: Vec<u8>) -> Self {
        assert_eq!(r.len(), g.len(), "r and g must have same length");
        assert_eq!(r.len(), b.len(), "r and b must have same length");
        Self { r, g, b, a: None }
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    fn get(&self, i: usize) -> Rgba {
        let a = self.a.as_ref().map_or(u8::MAX, |a| a[i]);
        Rgba::new(self.r[i], self.g[i], self.b[i], a)
    }

    fn put(&mut self, i: usize, color: Rgba) {
        self.r[i] = color.r;
        self.g[i] = color.g;
        self.b[i] = color.b;
        self.alpha_mut()[i] = color.a;
    }

    fn push(&mut self, color: Rgba) {
        self.alpha_mut().push(color.a);
        self.r.push(color.r);
        self.g.push(color.g);
        self.b.push(color.b);
    }

    // Materializes a missing alpha column as opaque.
    fn alpha_mut(&mut self) -> &mut Vec<u8> {
        let n = self.r.len();
        self.a.get_or_insert_with(|| vec![u8::MAX; n])
    }
}

/// Bit pattern of a finite coordinate, with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CoordKey([u32; 3]);

impl CoordKey {
    fn new(p: [f32; 3]) -> Option<Self> {
        if !p.iter().all(|v| v.is_finite()) {
            return None;
        }
        let bits = |v: f32| if v == 0.0 { 0 } else { v.to_bits() };
        Some(Self([bits(p[0]), bits(p[1]), bits(p[2])]))
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            colors: None,
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Builds a cloud without color data.
    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        let index = build_index(&x, &y, &z);
        Self {
            x,
            y,
            z,
            colors: None,
            index,
        }
    }

    pub fn from_xyzrgb(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>, colors: Colors) -> Self {
        assert_eq!(x.len(), colors.r.len(), "r must have one entry per point");
        assert_eq!(x.len(), colors.g.len(), "g must have one entry per point");
        assert_eq!(x.len(), colors.b.len(), "b must have one entry per point");
        if let Some(a) = &colors.a {
            assert_eq!(x.len(), a.len(), "alpha must have one entry per point");
        }
        let mut cloud = Self::from_xyz(x, y, z);
        cloud.colors = Some(colors);
        cloud
    }

    pub fn from_points(points: &[PointXYZRGBA]) -> Self {
        let mut colors = Colors::default();
        for p in points {
            colors.push(p.color);
        }
        Self::from_xyzrgb(
            points.iter().map(|p| p.x).collect(),
            points.iter().map(|p| p.y).collect(),
            points.iter().map(|p| p.z).collect(),
            colors,
        )
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Color of point `i`, or `None` when the cloud carries no color data.
    pub fn color(&self, i: usize) -> Option<Rgba> {
        assert!(i < self.len(), "index out of bounds");
        self.colors.as_ref().map(|c| c.get(i))
    }

    /// Color stored at an exact coordinate.
    pub fn get(&self, position: [f32; 3]) -> Option<Rgba> {
        let key = CoordKey::new(position)?;
        let &i = self.index.get(&key)?;
        self.colors.as_ref().map(|c| c.get(i))
    }

    pub fn contains(&self, position: [f32; 3]) -> bool {
        CoordKey::new(position).is_some_and(|key| self.index.contains_key(&key))
    }

    /// Inserts a colored point, overwriting the color of an existing point
    /// at the same coordinate.
    ///
    /// Fails with `PointInsertionFailed` for non-finite coordinates and for
    /// clouds that already hold uncolored points.
    pub fn set(&mut self, position: [f32; 3], color: Rgba) -> Result<()> {
        let key = CoordKey::new(position).ok_or_else(|| {
            Error::PointInsertionFailed(format!(
                "coordinate {position:?} is not finite"
            ))
        })?;

        if self.colors.is_none() && !self.is_empty() {
            return Err(Error::PointInsertionFailed(
                "cloud holds points without color data".into(),
            ));
        }
        let colors = self.colors.get_or_insert_with(Colors::default);

        match self.index.get(&key) {
            Some(&i) => colors.put(i, color),
            None => {
                self.index.insert(key, self.x.len());
                self.x.push(position[0]);
                self.y.push(position[1]);
                self.z.push(position[2]);
                colors.push(color);
            }
        }
        Ok(())
    }

    /// Visits points starting at `start`, at most `batch_size` of them
    /// (`0` means through the end). The visitor returns `false` to stop.
    ///
    /// Returns the number of points visited.
    pub fn iterate<F>(&self, start: usize, batch_size: usize, mut visitor: F) -> usize
    where
        F: FnMut([f32; 3], Option<Rgba>) -> bool,
    {
        let end = if batch_size == 0 {
            self.len()
        } else {
            start.saturating_add(batch_size).min(self.len())
        };

        let mut visited = 0;
        for i in start..end {
            visited += 1;
            if !visitor(self.point(i), self.colors.as_ref().map(|c| c.get(i))) {
                break;
            }
        }
        visited
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// Colored points in slot order; empty for clouds without color data.
    pub fn iter_colored(&self) -> impl Iterator<Item = PointXYZRGBA> + '_ {
        let n = if self.colors.is_some() { self.len() } else { 0 };
        (0..n).filter_map(move |i| {
            let color = self.colors.as_ref()?.get(i);
            Some(PointXYZRGBA::new(self.point(i), color))
        })
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

fn build_index(x: &[f32], y: &[f32], z: &[f32]) -> HashMap<CoordKey, usize> {
    let mut index = HashMap::with_capacity(x.len());
    for i in 0..x.len() {
        if let Some(key) = CoordKey::new([x[i], y[i], z[i]]) {
            index.insert(key, i);
        }
    }
    index
}
