use std::sync::Arc;

use tracing::instrument;

use crate::data::board_repository::BoardRepository;
use crate::domain::content::{
    Comment, MediaRef, Post, PostDetail, Reply, validate_content, validate_title,
};
use crate::domain::error::DomainError;
use crate::infrastructure::media::MediaStore;

/// An upload pulled off the wire but not yet persisted. Bytes are only
/// handed to the media store after the request validates.
#[derive(Debug)]
pub struct UploadedMedia {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// The content tree's mutation and read API. Validates before any byte
/// is persisted, so a rejected request leaves no entity and no file.
pub struct BoardService<R: BoardRepository + 'static> {
    repo: Arc<R>,
    media: Arc<dyn MediaStore>,
    require_secret: bool,
}

// Manual impl: the repository is shared through the Arc, so clones must
// not require R: Clone.
impl<R: BoardRepository> Clone for BoardService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            media: Arc::clone(&self.media),
            require_secret: self.require_secret,
        }
    }
}

impl<R> BoardService<R>
where
    R: BoardRepository + 'static,
{
    pub fn new(repo: Arc<R>, media: Arc<dyn MediaStore>, require_secret: bool) -> Self {
        Self {
            repo,
            media,
            require_secret,
        }
    }

    pub async fn get_post(&self, id: u64) -> Result<PostDetail, DomainError> {
        self.repo
            .find_post(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_posts().await
    }

    #[instrument(skip(self, upload, secret))]
    pub async fn create_post(
        &self,
        title: String,
        content: String,
        secret: Option<String>,
        upload: Option<UploadedMedia>,
    ) -> Result<Post, DomainError> {
        validate_title(&title)?;
        validate_content(&content)?;
        let secret = if self.require_secret {
            match secret {
                Some(s) if !s.is_empty() => Some(s),
                _ => return Err(DomainError::MissingField("secret")),
            }
        } else {
            None
        };
        let media = self.persist(upload).await?;
        self.repo.insert_post(title, content, secret, media).await
    }

    #[instrument(skip(self, upload))]
    pub async fn add_comment(
        &self,
        post_id: u64,
        content: String,
        upload: Option<UploadedMedia>,
    ) -> Result<Comment, DomainError> {
        validate_content(&content)?;
        if !self.repo.post_exists(post_id).await? {
            return Err(DomainError::PostNotFound(post_id));
        }
        let media = self.persist(upload).await?;
        self.repo.insert_comment(post_id, content, media).await
    }

    #[instrument(skip(self, upload))]
    pub async fn add_reply(
        &self,
        comment_id: u64,
        content: String,
        upload: Option<UploadedMedia>,
    ) -> Result<Reply, DomainError> {
        validate_content(&content)?;
        if !self.repo.comment_exists(comment_id).await? {
            return Err(DomainError::CommentNotFound(comment_id));
        }
        let media = self.persist(upload).await?;
        self.repo.insert_reply(comment_id, content, media).await
    }

    #[instrument(skip(self, supplied_secret))]
    pub async fn delete_post(
        &self,
        post_id: u64,
        supplied_secret: &str,
    ) -> Result<(), DomainError> {
        self.repo.delete_post(post_id, supplied_secret).await
    }

    async fn persist(
        &self,
        upload: Option<UploadedMedia>,
    ) -> Result<Option<MediaRef>, DomainError> {
        match upload {
            Some(upload) => {
                let media = self.media.save(upload.bytes, &upload.filename).await?;
                Ok(Some(media))
            }
            None => Ok(None),
        }
    }
}
