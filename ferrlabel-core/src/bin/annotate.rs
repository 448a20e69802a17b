use std::path::PathBuf;

use aws_config::BehaviorVersion;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ferrlabel_core::consts::*;
use ferrlabel_core::pipeline::prompt_image_keys;
use ferrlabel_core::source::{rekognition::RekognitionProvider, s3::S3Fetcher};
use ferrlabel_core::{Annotator, AnnotatorConfig, Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(name = "annotate")]
#[command(about = "Draw Rekognition labels onto images stored in S3")]
struct Args {
    #[arg(
        value_delimiter = ',',
        help = "Image keys to annotate; prompts on stdin when omitted"
    )]
    keys: Vec<String>,

    #[arg(short, long, default_value = DEFAULT_BUCKET, help = "Source bucket")]
    bucket: String,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_MIN_CONFIDENCE,
        help = "Minimum label confidence in percent"
    )]
    min_confidence: f32,

    #[arg(short, long, default_value = ".", help = "Output directory")]
    output: PathBuf,

    #[arg(long, default_value = FONT_NAME, help = "Caption truetype font")]
    font: String,

    #[arg(long, default_value_t = FONT_SIZE, help = "Caption font size in pixels")]
    font_size: f32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let keys: Vec<String> = args
        .keys
        .iter()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect();
    let keys = if keys.is_empty() {
        prompt_image_keys(std::io::stdin().lock(), std::io::stdout())?
    } else {
        keys
    };
    info!("Bucket: {}, keys: {:?}", args.bucket, keys);

    let annotator = Annotator::new(&AnnotatorConfig {
        font_name: args.font,
        font_size: args.font_size,
        ..AnnotatorConfig::default()
    });

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let fetcher = S3Fetcher::new(aws_sdk_s3::Client::new(&sdk_config));
    let provider = RekognitionProvider::new(aws_sdk_rekognition::Client::new(&sdk_config));

    let pipeline = Pipeline::new(
        fetcher,
        provider,
        annotator,
        PipelineConfig {
            bucket: args.bucket,
            min_confidence: args.min_confidence,
            output_dir: args.output,
        },
    );

    let outputs = pipeline.process_all(&keys).await?;

    println!("\n=== Annotation Summary ===");
    for output in &outputs {
        println!("  - {}", output.display());
    }

    info!("Annotation completed successfully!");
    Ok(())
}
