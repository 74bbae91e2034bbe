use super::ports::ObjectStorage;
use crate::domain::{Bucket, ImageUpload};
use agora_errors::AppError;
use std::sync::Arc;

pub struct ImageUploader<S: ObjectStorage> {
    storage: Arc<S>,
}

impl<S: ObjectStorage> Clone for ImageUploader<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: ObjectStorage> ImageUploader<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Validates and stores the image under a fresh name, returning its
    /// public URL.
    pub async fn upload(&self, bucket: Bucket, image: ImageUpload) -> Result<String, AppError> {
        image.validate()?;
        let path = image.object_path(bucket);
        let size = image.bytes.len();
        self.storage
            .upload(bucket, &path, image.bytes, &image.content_type)
            .await?;
        tracing::info!(%bucket, %path, size, "image uploaded");
        Ok(self.storage.public_url(bucket, &path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MAX_FILE_SIZE;
    use crate::infrastructure::memory::MemoryBackend;
    use crate::infrastructure::realtime::ChangeFeed;

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let backend = Arc::new(MemoryBackend::new(ChangeFeed::default()));
        let uploader = ImageUploader::new(Arc::clone(&backend));
        let url = uploader
            .upload(
                Bucket::Events,
                ImageUpload {
                    file_name: "affiche.png".to_string(),
                    content_type: "image/png".to_string(),
                    bytes: vec![1, 2, 3],
                },
            )
            .await
            .unwrap();

        let path = url
            .strip_prefix("/storage/events/")
            .expect("url points into the events bucket");
        assert!(path.starts_with("event-images/"));
        assert_eq!(backend.object(Bucket::Events, path), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_oversized_image_is_rejected_before_upload() {
        let backend = Arc::new(MemoryBackend::new(ChangeFeed::default()));
        backend.fail("upload");
        let uploader = ImageUploader::new(backend);
        let err = uploader
            .upload(
                Bucket::AccountPicture,
                ImageUpload {
                    file_name: "photo.jpg".to_string(),
                    content_type: "image/jpeg".to_string(),
                    bytes: vec![0; MAX_FILE_SIZE + 1],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
