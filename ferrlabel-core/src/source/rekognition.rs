use aws_sdk_rekognition::{
    Client,
    types::{self as rekognition, Image, S3Object},
};
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    analysis::{
        bbox::NormalizedBox,
        labels::{Instance, Label},
    },
    error::*,
    source::{ImageRef, LabelProvider},
};

/// Detects labels with Amazon Rekognition `DetectLabels`.
///
/// Rekognition reads the image straight from S3, so only the reference is
/// sent.
pub struct RekognitionProvider {
    client: Client,
}

impl RekognitionProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl LabelProvider for RekognitionProvider {
    async fn detect_labels(
        &self,
        image: &ImageRef,
        min_confidence: f32,
    ) -> Result<Vec<Label>, FerrlabelError> {
        let s3_object = S3Object::builder()
            .bucket(&image.bucket)
            .name(&image.key)
            .build();

        let output = self
            .client
            .detect_labels()
            .image(Image::builder().s3_object(s3_object).build())
            .min_confidence(min_confidence)
            .send()
            .await
            .context(DetectLabelsSnafu {
                bucket: &image.bucket,
                key: &image.key,
            })?;

        let labels = convert_labels(output.labels())?;
        info!(
            "labels detected for {image}: {}",
            serde_json::to_string(&labels).unwrap_or_default()
        );
        Ok(labels)
    }
}

/// Validates a `DetectLabels` response into owned labels.
///
/// Missing names, confidences or bounding boxes and out-of-range box
/// components are rejected. A label without instances is kept as is.
pub fn convert_labels(labels: &[rekognition::Label]) -> Result<Vec<Label>, FerrlabelError> {
    labels.iter().map(convert_label).collect()
}

fn convert_label(label: &rekognition::Label) -> Result<Label, FerrlabelError> {
    let name = label.name().context(MissingFieldSnafu {
        field: "Name",
        stage: "label",
    })?;
    let confidence = label.confidence().context(MissingFieldSnafu {
        field: "Confidence",
        stage: name,
    })?;
    let instances = label
        .instances()
        .iter()
        .map(|instance| convert_instance(name, instance))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Label::new(name, confidence, instances))
}

fn convert_instance(
    name: &str,
    instance: &rekognition::Instance,
) -> Result<Instance, FerrlabelError> {
    let stage = format!("{name}.Instances");
    let bounding_box = instance.bounding_box().context(MissingFieldSnafu {
        field: "BoundingBox",
        stage: &stage,
    })?;
    let confidence = instance.confidence().context(MissingFieldSnafu {
        field: "Confidence",
        stage: &stage,
    })?;

    let component = |field: &'static str, value: Option<f32>| -> Result<f32, FerrlabelError> {
        value.context(MissingFieldSnafu {
            field,
            stage: format!("{stage}.BoundingBox"),
        })
    };
    let normalized = NormalizedBox::new(
        component("Left", bounding_box.left())?,
        component("Top", bounding_box.top())?,
        component("Width", bounding_box.width())?,
        component("Height", bounding_box.height())?,
    )?;

    Ok(Instance::new(normalized, confidence))
}
