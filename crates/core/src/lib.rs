#![forbid(unsafe_code)]

pub mod cloud;
pub mod error;
pub mod point;

pub use cloud::{Colors, PointCloud};
pub use error::{Error, ErrorKind, Result, Stage};
pub use point::{PointXYZRGBA, Rgba};
