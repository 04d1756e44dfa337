use palette::{FromColor, Hsv, Lab, Srgb};

/// Saturation bounds of the warm band (HSV on sRGB).
pub const SATURATION_RANGE: (f32, f32) = (0.5, 0.8);

/// Value (brightness) bounds of the warm band.
pub const VALUE_RANGE: (f32, f32) = (0.3, 0.8);

/// Returns `true` if `color` lies inside the warm band. Hue is unconstrained.
pub fn is_warm(color: [u8; 3]) -> bool {
    let hsv: Hsv = Hsv::from_color(to_srgb(color));
    (SATURATION_RANGE.0..=SATURATION_RANGE.1).contains(&hsv.saturation)
        && (VALUE_RANGE.0..=VALUE_RANGE.1).contains(&hsv.value)
}

/// CIE76 color difference: Euclidean distance in L*a*b* (D65).
pub fn perceptual_distance(a: [u8; 3], b: [u8; 3]) -> f32 {
    lab_distance(&to_lab(a), &to_lab(b))
}

pub(crate) fn to_lab(color: [u8; 3]) -> Lab {
    Lab::from_color(to_srgb(color))
}

pub(crate) fn lab_distance(a: &Lab, b: &Lab) -> f32 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// Quantizes an HSV color (hue in degrees) to 8-bit sRGB.
pub(crate) fn hsv_to_rgb8(hue: f32, saturation: f32, value: f32) -> [u8; 3] {
    let hsv: Hsv = Hsv::new(hue, saturation, value);
    let rgb: Srgb = Srgb::from_color(hsv);
    let rgb: Srgb<u8> = rgb.into_format();
    [rgb.red, rgb.green, rgb.blue]
}

fn to_srgb(color: [u8; 3]) -> Srgb {
    Srgb::new(color[0], color[1], color[2]).into_format()
}
