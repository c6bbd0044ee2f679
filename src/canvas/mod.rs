pub mod image_source;
pub mod surface;
