use aws_sdk_s3::Client;
use bytes::Bytes;
use snafu::ResultExt;
use tracing::*;

use crate::{
    error::*,
    source::{ImageFetcher, ImageRef},
};

/// Fetches images from Amazon S3.
pub struct S3Fetcher {
    client: Client,
}

impl S3Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ImageFetcher for S3Fetcher {
    async fn fetch(&self, image: &ImageRef) -> Result<Bytes, FerrlabelError> {
        info!("downloading {image}");

        let object = self
            .client
            .get_object()
            .bucket(&image.bucket)
            .key(&image.key)
            .send()
            .await
            .context(ObjectFetchSnafu {
                bucket: &image.bucket,
                key: &image.key,
            })?;

        let body = object.body.collect().await.context(ObjectBodySnafu {
            bucket: &image.bucket,
            key: &image.key,
        })?;

        let bytes = body.into_bytes();
        debug!("downloaded {image}: {} bytes", bytes.len());
        Ok(bytes)
    }
}
