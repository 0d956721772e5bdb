use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

use crate::domain::content::MediaRef;
use crate::domain::error::DomainError;

/// Byte storage collaborator. The board core only keeps the returned
/// reference; serving the bytes back is the static-file layer's job.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn save(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<MediaRef, DomainError>;
}

/// Writes uploads under one directory, keyed by the client-supplied
/// filename. No sanitization or collision handling: two uploads with the
/// same name overwrite silently. Known gap, kept on purpose.
pub struct FsMediaStore {
    media_dir: PathBuf,
    thumbnail_dir: PathBuf,
}

impl FsMediaStore {
    pub fn new(media_dir: PathBuf, thumbnail_dir: PathBuf) -> Self {
        Self {
            media_dir,
            thumbnail_dir,
        }
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, bytes: Vec<u8>, suggested_name: &str) -> Result<MediaRef, DomainError> {
        let dest = self.media_dir.join(suggested_name);
        tokio::fs::write(&dest, &bytes).await.map_err(|e| {
            error!(file = suggested_name, "media write failed: {}", e);
            DomainError::MediaWrite(e.to_string())
        })?;
        debug!(file = suggested_name, size = bytes.len(), "media stored");

        if is_video(suggested_name) {
            let thumb = self.thumbnail_dir.join(suggested_name).with_extension("jpg");
            spawn_thumbnail(dest, thumb);
        }
        Ok(MediaRef(suggested_name.to_owned()))
    }
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv", "avi"];

fn is_video(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Best-effort still-frame extraction. The ffmpeg call runs detached and
/// any failure is swallowed: no error reaches the uploader, no retry.
fn spawn_thumbnail(video: PathBuf, thumbnail: PathBuf) {
    tokio::spawn(async move {
        let _ = Command::new("ffmpeg")
            .arg("-i")
            .arg(&video)
            .args(["-ss", "00:00:01", "-vframes", "1", "-s", "160x90", "-f", "image2"])
            .arg(&thumbnail)
            .output()
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (FsMediaStore, PathBuf) {
        let root = std::env::temp_dir().join(format!("board-media-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("media")).unwrap();
        std::fs::create_dir_all(root.join("thumbs")).unwrap();
        (
            FsMediaStore::new(root.join("media"), root.join("thumbs")),
            root,
        )
    }

    #[tokio::test]
    async fn save_returns_ref_named_after_upload() {
        let (store, root) = temp_store();
        let media = store.save(b"bytes".to_vec(), "cat.png").await.unwrap();
        assert_eq!(media, MediaRef("cat.png".into()));
        assert_eq!(std::fs::read(root.join("media/cat.png")).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn same_name_overwrites_silently() {
        let (store, root) = temp_store();
        store.save(b"one".to_vec(), "dup.png").await.unwrap();
        store.save(b"two".to_vec(), "dup.png").await.unwrap();
        assert_eq!(std::fs::read(root.join("media/dup.png")).unwrap(), b"two");
    }

    #[tokio::test]
    async fn write_into_missing_dir_is_media_write_error() {
        let store = FsMediaStore::new(
            PathBuf::from("/nonexistent-board-media-dir"),
            PathBuf::from("/nonexistent-board-thumb-dir"),
        );
        let err = store.save(b"x".to_vec(), "a.png").await.unwrap_err();
        assert!(matches!(err, DomainError::MediaWrite(_)));
    }

    #[test]
    fn video_extension_detection() {
        assert!(is_video("clip.mp4"));
        assert!(is_video("CLIP.MP4"));
        assert!(is_video("clip.webm"));
        assert!(!is_video("photo.png"));
        assert!(!is_video("noext"));
    }
}
