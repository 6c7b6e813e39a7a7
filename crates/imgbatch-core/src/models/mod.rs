pub mod image;
pub mod operation;
pub mod output;

pub use image::{ImageSize, Quality};
pub use operation::Operation;
pub use output::OutputDescriptor;
