use agora_errors::FieldErrors;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    AccountPicture,
    Events,
}

impl Bucket {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountPicture => "account-picture",
            Self::Events => "events",
        }
    }

    /// Directory objects of this bucket are written under.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::AccountPicture => "",
            Self::Events => "event-images/",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bucket inconnu: {0}")]
pub struct UnknownBucket(pub String);

impl FromStr for Bucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "account-picture" => Ok(Self::AccountPicture),
            "events" => Ok(Self::Events),
            other => Err(UnknownBucket(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !ACCEPTED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            errors.push(
                "image",
                "Format d'image non supporté. Utilisez JPEG, PNG ou WebP",
            );
        }
        if self.bytes.len() > MAX_FILE_SIZE {
            errors.push("image", "L'image ne doit pas dépasser 5 Mo");
        }
        errors.into_result()
    }

    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }

    /// Fresh object path inside `bucket`: `<prefix><uuid-v4>.<ext>`.
    pub fn object_path(&self, bucket: Bucket) -> String {
        format!(
            "{}{}.{}",
            bucket.prefix(),
            uuid::Uuid::new_v4(),
            self.extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "affiche.png".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_accepts_listed_types_up_to_limit() {
        for ty in ACCEPTED_IMAGE_TYPES {
            assert!(upload(ty, MAX_FILE_SIZE).validate().is_ok(), "{ty}");
        }
    }

    #[test]
    fn test_rejects_large_or_unknown_files() {
        let errors = upload("image/gif", MAX_FILE_SIZE + 1).validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("image").is_some());
    }

    #[test]
    fn test_event_paths_are_prefixed_and_unique() {
        let image = upload("image/webp", 10);
        let a = image.object_path(Bucket::Events);
        let b = image.object_path(Bucket::Events);
        assert!(a.starts_with("event-images/"));
        assert!(a.ends_with(".webp"));
        assert_ne!(a, b);
        assert!(!image.object_path(Bucket::AccountPicture).contains('/'));
    }
}
