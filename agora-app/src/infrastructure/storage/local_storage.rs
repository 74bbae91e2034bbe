use crate::application::ports::ObjectStorage;
use crate::domain::Bucket;
use agora_errors::AppError;
use std::path::{Component, Path, PathBuf};

/// Buckets as directories under `root`, served back at `public_base`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, bucket: Bucket, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        let clean = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !clean {
            return Err(AppError::Storage(format!("chemin d'objet invalide: {path}")));
        }
        Ok(self.root.join(bucket.name()).join(relative))
    }
}

impl ObjectStorage for LocalStorage {
    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        let target = self.resolve(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        tracing::debug!(%bucket, path, content_type, "object written");
        Ok(())
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!("{}/{}/{}", self.public_base, bucket.name(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("agora-storage-{name}-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_upload_writes_under_bucket() {
        let root = temp_root("write");
        let storage = LocalStorage::new(&root, "/storage/");
        storage
            .upload(Bucket::Events, "event-images/a.png", vec![7, 7], "image/png")
            .await
            .unwrap();

        let written = tokio::fs::read(root.join("events/event-images/a.png"))
            .await
            .unwrap();
        assert_eq!(written, vec![7, 7]);
        assert_eq!(
            storage.public_url(Bucket::Events, "event-images/a.png"),
            "/storage/events/event-images/a.png"
        );
        let _ = tokio::fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_traversal_is_rejected() {
        let storage = LocalStorage::new(temp_root("traversal"), "/storage");
        for path in ["../secret.png", "/etc/passwd", ""] {
            let err = storage
                .upload(Bucket::AccountPicture, path, vec![1], "image/png")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Storage(_)), "{path}");
        }
    }
}
