use aws_sdk_rekognition::operation::detect_labels::DetectLabelsError;
use aws_sdk_s3::{operation::get_object::GetObjectError, primitives::ByteStreamError};
use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum FerrlabelError {
    #[snafu(display("Fetch object `{}/{}` error: {}", bucket, key, source))]
    ObjectFetch {
        source: aws_sdk_s3::error::SdkError<GetObjectError>,
        bucket: String,
        key: String,
    },
    #[snafu(display("Read body of object `{}/{}` error: {}", bucket, key, source))]
    ObjectBody {
        source: ByteStreamError,
        bucket: String,
        key: String,
    },
    #[snafu(display("Detect labels for `{}/{}` error: {}", bucket, key, source))]
    DetectLabels {
        source: aws_sdk_rekognition::error::SdkError<DetectLabelsError>,
        bucket: String,
        key: String,
    },
    #[snafu(display("Label response is missing field `{}` at `{}`", field, stage))]
    MissingField { field: String, stage: String },
    #[snafu(display(
        "Bounding box component `{}` out of range [0, 1]: {}",
        component,
        value
    ))]
    InvalidBox { component: String, value: f32 },
    #[snafu(display("Load Font error: {}", source))]
    Font { source: ab_glyph::InvalidFont },
    #[snafu(display("Image Decode `{}` error: {}", path, source))]
    ImageDecode {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Unknown image format for `{}`", path))]
    UnknownFormat { path: String },
    #[snafu(display("Image Write error: {}", source))]
    ImageWrite {
        source: image::ImageError,
        path: String,
    },
    #[snafu(display("Write `{}` error: {}", path, source))]
    IoWrite {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Read `{}` error: {}", stage, source))]
    IoRead {
        source: std::io::Error,
        stage: String,
    },
}
