/// An 8-bit color with alpha. Sources without an alpha channel read as opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, u8::MAX)
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgba {
    fn from(rgb: [u8; 3]) -> Self {
        Self::opaque(rgb[0], rgb[1], rgb[2])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointXYZRGBA {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub color: Rgba,
}

impl PointXYZRGBA {
    pub fn new(position: [f32; 3], color: Rgba) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            color,
        }
    }

    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}
