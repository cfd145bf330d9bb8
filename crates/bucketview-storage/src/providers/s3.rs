//! S3-compatible object storage provider (requires the `s3` feature).

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use bucketview_core::config::storage::S3StorageConfig;
use bucketview_core::config::transfer::TransferConfig;
use bucketview_core::error::{AppError, ErrorKind};
use bucketview_core::result::AppResult;
use bucketview_core::traits::storage::{ByteStream, ObjectStore};
use bucketview_core::types::{ListPage, ObjectEntry};

/// S3 requires every multipart part but the last to be at least 5 MB.
const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

/// S3-compatible storage provider bound to one bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    page_size: i32,
    part_size: usize,
    chunk_size: usize,
}

impl S3ObjectStore {
    /// Create a new S3 object store from static credentials.
    ///
    /// Fails with an authentication error before any network call when the
    /// access key, secret key, or bucket name is missing. Downloads are
    /// streamed in `transfer.chunk_size_bytes` chunks.
    pub async fn new(
        config: &S3StorageConfig,
        page_size: i32,
        transfer: &TransferConfig,
    ) -> AppResult<Self> {
        if !config.has_credentials() {
            return Err(AppError::authentication(
                "Please provide all the required details (access key, secret key, bucket)",
            ));
        }

        let credentials = Credentials::new(
            config.access_key.trim(),
            config.secret_key.trim(),
            None,
            None,
            "bucketview-config",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(config.endpoint.clone());
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 object store"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.trim().to_string(),
            page_size: page_size.clamp(1, 1000),
            part_size: transfer.multipart_part_size_bytes.max(MIN_PART_SIZE),
            chunk_size: transfer.chunk_size_bytes.max(1),
        })
    }

    async fn put_single(&self, key: &str, mut body: ByteStream, size_bytes: u64) -> AppResult<()> {
        let mut buffer = BytesMut::with_capacity(size_bytes as usize);
        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk.map_err(|e| stream_error(key, e))?);
        }

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(buffer.len() as i64)
            .body(S3ByteStream::from(buffer.freeze()))
            .send()
            .await
            .map_err(|e| map_sdk_error("put", key, e))?;
        Ok(())
    }

    async fn put_multipart(&self, key: &str, body: ByteStream) -> AppResult<()> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("create multipart upload", key, e))?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| AppError::storage(format!("No upload ID returned for '{key}'")))?
            .to_string();

        let parts = match self.upload_parts(key, &upload_id, body).await {
            Ok(parts) => parts,
            Err(e) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(key, error = %DisplayErrorContext(&abort_err), "Failed to abort multipart upload");
                }
                return Err(e);
            }
        };

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| map_sdk_error("complete multipart upload", key, e))?;
        Ok(())
    }

    async fn upload_parts(
        &self,
        key: &str,
        upload_id: &str,
        mut body: ByteStream,
    ) -> AppResult<Vec<CompletedPart>> {
        let mut parts = Vec::new();
        let mut buffer = BytesMut::with_capacity(self.part_size);

        while let Some(chunk) = body.next().await {
            buffer.extend_from_slice(&chunk.map_err(|e| stream_error(key, e))?);
            while buffer.len() >= self.part_size {
                let part = buffer.split_to(self.part_size).freeze();
                parts.push(self.upload_part(key, upload_id, parts.len() as i32 + 1, part).await?);
            }
        }
        if !buffer.is_empty() || parts.is_empty() {
            let part = buffer.freeze();
            parts.push(self.upload_part(key, upload_id, parts.len() as i32 + 1, part).await?);
        }
        Ok(parts)
    }

    async fn upload_part(
        &self,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: Bytes,
    ) -> AppResult<CompletedPart> {
        let size = data.len();
        let output = self
            .client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .content_length(size as i64)
            .body(S3ByteStream::from(data))
            .send()
            .await
            .map_err(|e| map_sdk_error("upload part", key, e))?;

        debug!(key, part_number, bytes = size, "Uploaded part");
        Ok(CompletedPart::builder()
            .set_e_tag(output.e_tag().map(str::to_string))
            .part_number(part_number)
            .build())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn health_check(&self) -> AppResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| map_sdk_error("connect", &self.bucket, e))?;
        Ok(())
    }

    async fn list_objects(
        &self,
        prefix: Option<&str>,
        continuation_token: Option<&str>,
    ) -> AppResult<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(self.page_size)
            .set_prefix(prefix.filter(|p| !p.is_empty()).map(str::to_string))
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| map_sdk_error("list", prefix.unwrap_or(""), e))?;

        let entries = output
            .contents()
            .iter()
            .filter_map(|obj| {
                let key = obj.key()?;
                Some(ObjectEntry::new(key, obj.size().unwrap_or(0).max(0) as u64))
            })
            .collect();

        let next_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage {
            entries,
            next_token,
        })
    }

    async fn head_object(&self, key: &str) -> AppResult<u64> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("head", key, e))?;
        Ok(output.content_length().unwrap_or(0).max(0) as u64)
    }

    async fn get_object(&self, key: &str) -> AppResult<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("get", key, e))?;

        let reader = output.body.into_async_read();
        Ok(Box::pin(ReaderStream::with_capacity(reader, self.chunk_size)))
    }

    async fn put_object(&self, key: &str, body: ByteStream, size_bytes: u64) -> AppResult<()> {
        if size_bytes as usize > self.part_size {
            self.put_multipart(key, body).await
        } else {
            self.put_single(key, body, size_bytes).await
        }
    }

    async fn delete_object(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error("delete", key, e))?;
        Ok(())
    }
}

fn stream_error(key: &str, e: std::io::Error) -> AppError {
    AppError::with_source(
        ErrorKind::Transfer,
        format!("Upload stream failed for '{key}'"),
        e,
    )
}

/// Map an SDK error onto the application error kinds.
fn map_sdk_error<E>(operation: &str, key: &str, err: SdkError<E, HttpResponse>) -> AppError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let kind = match &err {
        SdkError::ServiceError(_) => {
            let status = err.raw_response().map(|r| r.status().as_u16());
            classify(err.code(), status)
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ErrorKind::Transfer
        }
        _ => ErrorKind::Storage,
    };
    let message = format!("S3 {operation} failed for '{key}': {}", DisplayErrorContext(&err));
    AppError::with_source(kind, message, err)
}

fn classify(code: Option<&str>, status: Option<u16>) -> ErrorKind {
    match code {
        Some("NoSuchKey" | "NotFound" | "NoSuchBucket") => return ErrorKind::NotFound,
        Some(
            "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "AccessDenied" | "ExpiredToken"
            | "InvalidToken" | "Forbidden",
        ) => return ErrorKind::Authentication,
        Some("InternalError" | "SlowDown" | "ServiceUnavailable" | "RequestTimeout") => {
            return ErrorKind::Transfer;
        }
        _ => {}
    }
    match status {
        Some(404) => ErrorKind::NotFound,
        Some(401 | 403) => ErrorKind::Authentication,
        Some(408 | 429) => ErrorKind::Transfer,
        Some(s) if s >= 500 => ErrorKind::Transfer,
        _ => ErrorKind::Storage,
    }
}
