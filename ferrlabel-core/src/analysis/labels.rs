use serde::Serialize;

use crate::analysis::bbox::NormalizedBox;

/// A detected object or category.
///
/// Label-level detections carry no instances; only instances are drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub name: String,
    /// Confidence in percent, `[0, 100]`.
    pub confidence: f32,
    pub instances: Vec<Instance>,
}

/// One spatial occurrence of a [`Label`] within an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub bounding_box: NormalizedBox,
    /// Confidence in percent, `[0, 100]`.
    pub confidence: f32,
}

impl Label {
    pub fn new(name: impl Into<String>, confidence: f32, instances: Vec<Instance>) -> Self {
        Self {
            name: name.into(),
            confidence,
            instances,
        }
    }

    /// Caption drawn above one instance of this label, e.g. `Dog (95.50%)`.
    pub fn caption(&self, instance: &Instance) -> String {
        format!("{} ({:.2}%)", self.name, instance.confidence)
    }
}

impl Instance {
    pub fn new(bounding_box: NormalizedBox, confidence: f32) -> Self {
        Self {
            bounding_box,
            confidence,
        }
    }
}
