#![forbid(unsafe_code)]

pub mod generate;
pub mod warm;

pub use generate::{
    generate_palette, generate_palette_seeded, try_generate_palette, MAX_DISTINCT_COLORS,
    MIN_PERCEPTUAL_DISTANCE,
};
pub use warm::{is_warm, perceptual_distance, SATURATION_RANGE, VALUE_RANGE};
