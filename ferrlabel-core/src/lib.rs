pub mod analysis;
pub mod consts;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use pipeline::{Pipeline, PipelineConfig};
pub use render::annotator::{Annotator, AnnotatorConfig};
pub use source::{ImageFetcher, ImageRef, LabelProvider};
