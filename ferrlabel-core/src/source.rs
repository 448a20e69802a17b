use std::{fmt, future::Future};

use bytes::Bytes;

use crate::{analysis::labels::Label, error::FerrlabelError};

pub mod rekognition;
pub mod s3;

/// Location of one image in the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub bucket: String,
    pub key: String,
}

impl ImageRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Downloads raw image bytes.
pub trait ImageFetcher {
    fn fetch(&self, image: &ImageRef) -> impl Future<Output = Result<Bytes, FerrlabelError>>;
}

/// Detects labels, and the spatial instances of each, in a stored image.
pub trait LabelProvider {
    /// Labels scoring at least `min_confidence` percent, in service order.
    fn detect_labels(
        &self,
        image: &ImageRef,
        min_confidence: f32,
    ) -> impl Future<Output = Result<Vec<Label>, FerrlabelError>>;
}
