//! Persistence of the harvested record sets.
//!
//! Each record set becomes one pretty-printed JSON array, written to the
//! output directory and uploaded to the object store under a fixed key.
//! Failures are reported per artifact; none of them stops the others.

use anyhow::{Context, Result};
use aws_credential_types::provider::ProvideCredentials;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::pipeline::Harvest;

pub const CHANNELS_KEY: &str = "channel_info.json";
pub const VIDEOS_KEY: &str = "videos_info.json";
pub const COMMENTS_KEY: &str = "videos_comments.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("credentials not available: {0}")]
    CredentialsUnavailable(String),

    #[error("upload failed: {0}")]
    Upload(String),
}

/// Destination for uploaded documents.
pub trait ObjectStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;
}

/// S3 store backed by the AWS SDK and the default credential chain.
///
/// The SDK is async; the store owns a single-threaded runtime and blocks on
/// each upload so the rest of the harvest stays sequential.
pub struct S3Store {
    runtime: tokio::runtime::Runtime,
    client: aws_sdk_s3::Client,
    credentials: Option<aws_credential_types::provider::SharedCredentialsProvider>,
}

impl S3Store {
    pub fn from_env() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building runtime for the S3 client")?;
        let config = runtime.block_on(aws_config::load_defaults(
            aws_config::BehaviorVersion::latest(),
        ));
        let client = aws_sdk_s3::Client::new(&config);
        Ok(Self {
            runtime,
            client,
            credentials: config.credentials_provider(),
        })
    }
}

impl ObjectStore for S3Store {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.runtime.block_on(async {
            let Some(provider) = &self.credentials else {
                return Err(StoreError::CredentialsUnavailable(
                    "no credentials provider configured".to_string(),
                ));
            };
            provider
                .provide_credentials()
                .await
                .map_err(|err| StoreError::CredentialsUnavailable(err.to_string()))?;

            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(aws_sdk_s3::primitives::ByteStream::from(body))
                .content_type(content_type)
                .send()
                .await
                .map_err(|err| {
                    StoreError::Upload(aws_sdk_s3::error::DisplayErrorContext(&err).to_string())
                })?;
            Ok(())
        })
    }
}

/// Where and whether to persist.
#[derive(Debug, Clone)]
pub struct SinkTarget {
    pub output_dir: PathBuf,
    pub bucket_name: String,
    pub upload: bool,
}

/// Outcome of one artifact.
#[derive(Debug)]
pub struct ArtifactReport {
    pub key: &'static str,
    pub records: usize,
    pub local: Result<PathBuf>,
    /// `None` when uploads are disabled.
    pub upload: Option<Result<(), StoreError>>,
}

impl ArtifactReport {
    pub fn local_failed(&self) -> bool {
        self.local.is_err()
    }
}

/// Writes all three documents locally, then uploads each one.
pub fn persist(
    harvest: &Harvest,
    target: &SinkTarget,
    store: Option<&dyn ObjectStore>,
) -> Vec<ArtifactReport> {
    vec![
        persist_artifact(CHANNELS_KEY, &harvest.channels, target, store),
        persist_artifact(VIDEOS_KEY, &harvest.videos, target, store),
        persist_artifact(COMMENTS_KEY, &harvest.comments, target, store),
    ]
}

fn persist_artifact<T: Serialize>(
    key: &'static str,
    records: &[T],
    target: &SinkTarget,
    store: Option<&dyn ObjectStore>,
) -> ArtifactReport {
    let payload = match render(records) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(key, error = %err, "could not serialize records");
            return ArtifactReport {
                key,
                records: records.len(),
                local: Err(err),
                upload: None,
            };
        }
    };

    let local = write_local(&target.output_dir, key, &payload);
    match &local {
        Ok(path) => tracing::info!(path = %path.display(), records = records.len(), "wrote records"),
        Err(err) => tracing::error!(key, error = ?err, "local write failed"),
    }

    let upload = match (target.upload, store) {
        (true, Some(store)) => Some(upload_artifact(store, &target.bucket_name, key, payload)),
        _ => None,
    };

    ArtifactReport {
        key,
        records: records.len(),
        local,
        upload,
    }
}

/// Pretty-printed JSON array, newline terminated.
pub fn render<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut payload = serde_json::to_vec_pretty(records).context("serializing records")?;
    payload.push(b'\n');
    Ok(payload)
}

/// Replaces `dir/name` atomically: the payload lands in a temp file next to
/// the target and is renamed over it.
pub fn write_local(dir: &Path, name: &str, payload: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(name);
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(payload)
        .with_context(|| format!("writing {}", path.display()))?;
    tmp.persist(&path)
        .with_context(|| format!("finalizing {}", path.display()))?;
    Ok(path)
}

fn upload_artifact(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    payload: Vec<u8>,
) -> Result<(), StoreError> {
    let content_type = mime_guess::from_path(key)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    let result = store.put_object(bucket, key, payload, &content_type);
    match &result {
        Ok(()) => tracing::info!(bucket, key, "uploaded"),
        Err(StoreError::CredentialsUnavailable(reason)) => {
            tracing::error!(bucket, key, reason = %reason, "credentials not available")
        }
        Err(err) => tracing::error!(bucket, key, error = %err, "upload failed"),
    }
    result
}
