use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use image::ImageFormat;
use snafu::{OptionExt, ResultExt};
use tracing::*;

use crate::{
    consts::*,
    error::*,
    render::annotator::Annotator,
    source::{ImageFetcher, ImageRef, LabelProvider},
};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub bucket: String,
    pub min_confidence: f32,
    /// Directory the `downloaded_<key>` files are written to.
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Fetches, labels, annotates and saves images one at a time.
pub struct Pipeline<F, P> {
    fetcher: F,
    provider: P,
    annotator: Annotator,
    config: PipelineConfig,
}

impl<F: ImageFetcher, P: LabelProvider> Pipeline<F, P> {
    pub fn new(fetcher: F, provider: P, annotator: Annotator, config: PipelineConfig) -> Self {
        Self {
            fetcher,
            provider,
            annotator,
            config,
        }
    }

    /// Local path the object `key` is downloaded to and annotated in place.
    pub fn download_path(&self, key: &str) -> PathBuf {
        self.config
            .output_dir
            .join(format!("{DOWNLOAD_PREFIX}{key}"))
    }

    /// Processes every key in order and returns the annotated files.
    ///
    /// Stops at the first failure; files written for earlier keys stay on disk.
    pub async fn process_all<S: AsRef<str>>(
        &self,
        keys: &[S],
    ) -> Result<Vec<PathBuf>, FerrlabelError> {
        let mut outputs = Vec::with_capacity(keys.len());
        for key in keys {
            outputs.push(self.process(key.as_ref()).await?);
        }
        Ok(outputs)
    }

    /// Downloads `key`, detects its labels, draws them and overwrites the
    /// download with the annotated image in its original format.
    pub async fn process(&self, key: &str) -> Result<PathBuf, FerrlabelError> {
        let image_ref = ImageRef::new(&self.config.bucket, key);
        let path = self.download_path(key);
        let path_str = path.to_string_lossy().to_string();

        let bytes = self.fetcher.fetch(&image_ref).await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(IoWriteSnafu { path: &path_str })?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .context(IoWriteSnafu { path: &path_str })?;
        info!("saved {image_ref} to {path_str}");

        let labels = self
            .provider
            .detect_labels(&image_ref, self.config.min_confidence)
            .await?;

        let format =
            detect_format(&bytes, &path).context(UnknownFormatSnafu { path: &path_str })?;
        let image = image::load_from_memory_with_format(&bytes, format)
            .context(ImageDecodeSnafu { path: &path_str })?;

        let annotated = self.annotator.annotate(image, &labels);
        annotated
            .save_with_format(&path, format)
            .context(ImageWriteSnafu { path: &path_str })?;
        info!("annotated {image_ref} into {path_str}");

        Ok(path)
    }
}

/// Format sniffed from the image bytes, else from the file extension.
fn detect_format(bytes: &[u8], path: &Path) -> Option<ImageFormat> {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok())
}

/// Splits comma-separated image keys, trimming whitespace and dropping empty
/// entries.
pub fn parse_image_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(String::from)
        .collect()
}

/// Prompts on `output` and reads one line of comma-separated keys from `input`.
pub fn prompt_image_keys<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
) -> Result<Vec<String>, FerrlabelError> {
    write!(output, "Enter the image names separated by commas: ")
        .and_then(|_| output.flush())
        .context(IoWriteSnafu { path: "<prompt>" })?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context(IoReadSnafu { stage: "image keys" })?;

    Ok(parse_image_keys(&line))
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap, io::Cursor};

    use bytes::Bytes;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;
    use crate::{
        analysis::{
            bbox::NormalizedBox,
            labels::{Instance, Label},
        },
        render::font::CaptionFont,
    };

    #[derive(Default)]
    struct MemoryFetcher {
        objects: HashMap<String, Bytes>,
        requests: RefCell<Vec<ImageRef>>,
    }

    impl ImageFetcher for MemoryFetcher {
        async fn fetch(&self, image: &ImageRef) -> Result<Bytes, FerrlabelError> {
            self.requests.borrow_mut().push(image.clone());
            self.objects
                .get(&image.key)
                .cloned()
                .context(MissingFieldSnafu {
                    field: "Body",
                    stage: image.to_string(),
                })
        }
    }

    #[derive(Default)]
    struct FixedProvider {
        labels: HashMap<String, Vec<Label>>,
        requests: RefCell<Vec<(ImageRef, f32)>>,
    }

    impl LabelProvider for FixedProvider {
        async fn detect_labels(
            &self,
            image: &ImageRef,
            min_confidence: f32,
        ) -> Result<Vec<Label>, FerrlabelError> {
            self.requests
                .borrow_mut()
                .push((image.clone(), min_confidence));
            Ok(self.labels.get(&image.key).cloned().unwrap_or_default())
        }
    }

    fn encode(image: DynamicImage, format: ImageFormat) -> Bytes {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, format).unwrap();
        Bytes::from(buffer.into_inner())
    }

    fn cat_label() -> Label {
        let bounding_box = NormalizedBox::new(0.25, 0.2, 0.5, 0.3).unwrap();
        Label::new("Cat", 99.1, vec![Instance::new(bounding_box, 99.1)])
    }

    fn pipeline(
        fetcher: MemoryFetcher,
        provider: FixedProvider,
        output_dir: &Path,
    ) -> Pipeline<MemoryFetcher, FixedProvider> {
        let config = PipelineConfig {
            output_dir: output_dir.to_path_buf(),
            ..PipelineConfig::default()
        };
        Pipeline::new(
            fetcher,
            provider,
            Annotator::with_font(CaptionFont::builtin(FONT_SIZE)),
            config,
        )
    }

    #[test]
    fn test_parse_image_keys() {
        assert_eq!(
            parse_image_keys(" cat.jpg, dog.png ,bird.jpeg\n"),
            ["cat.jpg", "dog.png", "bird.jpeg"]
        );
        assert_eq!(parse_image_keys("cat.jpg,, ,"), ["cat.jpg"]);
        assert!(parse_image_keys("\n").is_empty());
    }

    #[test]
    fn test_prompt_image_keys() {
        let mut prompt = Vec::new();
        let keys = prompt_image_keys(Cursor::new("a.png, b.png\n"), &mut prompt).unwrap();

        assert_eq!(keys, ["a.png", "b.png"]);
        assert_eq!(
            String::from_utf8(prompt).unwrap(),
            "Enter the image names separated by commas: "
        );
    }

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.bucket, "image-label-generator");
        assert_eq!(config.min_confidence, 90.0);
    }

    #[tokio::test]
    async fn test_process_two_images_independently() {
        let dir = tempfile::tempdir().unwrap();
        let background = Rgb([0, 128, 0]);

        let mut fetcher = MemoryFetcher::default();
        fetcher.objects.insert(
            "cat.png".to_string(),
            encode(
                DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 100, background)),
                ImageFormat::Png,
            ),
        );
        fetcher.objects.insert(
            "empty.png".to_string(),
            encode(
                DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, background)),
                ImageFormat::Png,
            ),
        );
        let mut provider = FixedProvider::default();
        provider
            .labels
            .insert("cat.png".to_string(), vec![cat_label()]);

        let pipeline = pipeline(fetcher, provider, dir.path());
        let outputs = pipeline
            .process_all(&["cat.png", "empty.png"])
            .await
            .unwrap();

        assert_eq!(
            outputs,
            [
                dir.path().join("downloaded_cat.png"),
                dir.path().join("downloaded_empty.png"),
            ]
        );

        let cat = image::open(&outputs[0]).unwrap().to_rgb8();
        assert_eq!(cat.dimensions(), (200, 100));
        assert_eq!(*cat.get_pixel(100, 50), Rgb([255, 0, 0]));
        assert_eq!(*cat.get_pixel(100, 20), Rgb([0, 0, 0]));

        let empty = image::open(&outputs[1]).unwrap().to_rgb8();
        assert_eq!(empty, RgbImage::from_pixel(64, 48, background));

        let requests = pipeline.provider.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[0],
            (ImageRef::new("image-label-generator", "cat.png"), 90.0)
        );
        assert_eq!(requests[1].0.key, "empty.png");
    }

    #[tokio::test]
    async fn test_process_uses_configured_bucket_and_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = MemoryFetcher::default();
        fetcher.objects.insert(
            "a.png".to_string(),
            encode(
                DynamicImage::ImageRgb8(RgbImage::new(8, 8)),
                ImageFormat::Png,
            ),
        );
        let config = PipelineConfig {
            bucket: "holiday-photos".to_string(),
            min_confidence: 75.0,
            output_dir: dir.path().join("out"),
        };
        let pipeline = Pipeline::new(
            fetcher,
            FixedProvider::default(),
            Annotator::with_font(CaptionFont::builtin(FONT_SIZE)),
            config,
        );

        let output = pipeline.process("a.png").await.unwrap();

        assert_eq!(output, dir.path().join("out").join("downloaded_a.png"));
        assert_eq!(
            pipeline.fetcher.requests.borrow()[0],
            ImageRef::new("holiday-photos", "a.png")
        );
        assert_eq!(
            pipeline.provider.requests.borrow()[0],
            (ImageRef::new("holiday-photos", "a.png"), 75.0)
        );
    }

    #[tokio::test]
    async fn test_process_keeps_format_and_drops_alpha() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = MemoryFetcher::default();
        fetcher.objects.insert(
            "nested/logo.png".to_string(),
            encode(
                DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 40, Rgba([1, 2, 3, 100]))),
                ImageFormat::Png,
            ),
        );
        fetcher.objects.insert(
            "photo.jpg".to_string(),
            encode(
                DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 40, Rgb([200, 200, 200]))),
                ImageFormat::Jpeg,
            ),
        );

        let pipeline = pipeline(fetcher, FixedProvider::default(), dir.path());

        let logo = pipeline.process("nested/logo.png").await.unwrap();
        assert_eq!(logo, dir.path().join("downloaded_nested/logo.png"));
        let bytes = std::fs::read(&logo).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());

        let photo = pipeline.process("photo.jpg").await.unwrap();
        let bytes = std::fs::read(&photo).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[tokio::test]
    async fn test_process_all_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = MemoryFetcher::default();
        fetcher.objects.insert(
            "a.png".to_string(),
            encode(
                DynamicImage::ImageRgb8(RgbImage::new(8, 8)),
                ImageFormat::Png,
            ),
        );
        fetcher.objects.insert(
            "c.png".to_string(),
            encode(
                DynamicImage::ImageRgb8(RgbImage::new(8, 8)),
                ImageFormat::Png,
            ),
        );

        let pipeline = pipeline(fetcher, FixedProvider::default(), dir.path());
        let result = pipeline.process_all(&["a.png", "missing.png", "c.png"]).await;

        assert!(result.is_err());
        assert!(dir.path().join("downloaded_a.png").exists());
        assert!(!dir.path().join("downloaded_c.png").exists());
        assert_eq!(pipeline.fetcher.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_process_rejects_undecodable_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = MemoryFetcher::default();
        fetcher
            .objects
            .insert("notes.txt".to_string(), Bytes::from_static(b"plain text"));

        let pipeline = pipeline(fetcher, FixedProvider::default(), dir.path());
        let err = pipeline.process("notes.txt").await.unwrap_err();

        assert!(matches!(err, FerrlabelError::UnknownFormat { .. }));
    }
}
