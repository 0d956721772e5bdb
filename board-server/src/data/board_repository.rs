use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::content::{Comment, CommentThread, MediaRef, Post, PostDetail, Reply};
use crate::domain::error::DomainError;
use crate::domain::ownership;

#[async_trait]
pub trait BoardRepository: Send + Sync {
    async fn insert_post(
        &self,
        title: String,
        content: String,
        secret: Option<String>,
        media: Option<MediaRef>,
    ) -> Result<Post, DomainError>;
    async fn insert_comment(
        &self,
        post_id: u64,
        content: String,
        media: Option<MediaRef>,
    ) -> Result<Comment, DomainError>;
    async fn insert_reply(
        &self,
        comment_id: u64,
        content: String,
        media: Option<MediaRef>,
    ) -> Result<Reply, DomainError>;
    async fn find_post(&self, id: u64) -> Result<Option<PostDetail>, DomainError>;
    async fn list_posts(&self) -> Result<Vec<Post>, DomainError>;
    async fn post_exists(&self, id: u64) -> Result<bool, DomainError>;
    async fn comment_exists(&self, id: u64) -> Result<bool, DomainError>;
    /// Authorizes against the stored secret and cascade-deletes the post
    /// with all descendant comments and replies, atomically.
    async fn delete_post(&self, id: u64, supplied_secret: &str) -> Result<(), DomainError>;
}

/// Arena-style board state: flat id-to-record maps plus parent-to-children
/// indexes. Ids are allocated from monotonic counters and never reused.
#[derive(Default)]
struct BoardState {
    posts: HashMap<u64, Post>,
    comments: HashMap<u64, Comment>,
    replies: HashMap<u64, Reply>,
    /// Insertion order of post ids; read in reverse for newest-first.
    post_order: Vec<u64>,
    comments_by_post: HashMap<u64, Vec<u64>>,
    replies_by_comment: HashMap<u64, Vec<u64>>,
    next_post_id: u64,
    next_comment_id: u64,
    next_reply_id: u64,
}

/// Process-scoped store. One write lock covers every tree mutation, so a
/// cascade delete is never partially visible and a delete racing a
/// comment-add resolves deterministically.
#[derive(Default)]
pub struct MemoryBoardRepository {
    state: RwLock<BoardState>,
}

impl MemoryBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardRepository for MemoryBoardRepository {
    async fn insert_post(
        &self,
        title: String,
        content: String,
        secret: Option<String>,
        media: Option<MediaRef>,
    ) -> Result<Post, DomainError> {
        let mut state = self.state.write().await;
        state.next_post_id += 1;
        let post = Post {
            id: state.next_post_id,
            title,
            content,
            media,
            created_at: Utc::now(),
            secret,
        };
        state.post_order.push(post.id);
        state.posts.insert(post.id, post.clone());
        info!(post_id = post.id, "post created");
        Ok(post)
    }

    async fn insert_comment(
        &self,
        post_id: u64,
        content: String,
        media: Option<MediaRef>,
    ) -> Result<Comment, DomainError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Err(DomainError::PostNotFound(post_id));
        }
        state.next_comment_id += 1;
        let comment = Comment {
            id: state.next_comment_id,
            post_id,
            content,
            media,
            created_at: Utc::now(),
        };
        state
            .comments_by_post
            .entry(post_id)
            .or_default()
            .push(comment.id);
        state.comments.insert(comment.id, comment.clone());
        info!(comment_id = comment.id, post_id, "comment added");
        Ok(comment)
    }

    async fn insert_reply(
        &self,
        comment_id: u64,
        content: String,
        media: Option<MediaRef>,
    ) -> Result<Reply, DomainError> {
        let mut state = self.state.write().await;
        if !state.comments.contains_key(&comment_id) {
            return Err(DomainError::CommentNotFound(comment_id));
        }
        state.next_reply_id += 1;
        let reply = Reply {
            id: state.next_reply_id,
            comment_id,
            content,
            media,
            created_at: Utc::now(),
        };
        state
            .replies_by_comment
            .entry(comment_id)
            .or_default()
            .push(reply.id);
        state.replies.insert(reply.id, reply.clone());
        info!(reply_id = reply.id, comment_id, "reply added");
        Ok(reply)
    }

    async fn find_post(&self, id: u64) -> Result<Option<PostDetail>, DomainError> {
        let state = self.state.read().await;
        let Some(post) = state.posts.get(&id) else {
            return Ok(None);
        };
        let comments = state
            .comments_by_post
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|cid| state.comments.get(cid))
            .map(|comment| CommentThread {
                comment: comment.clone(),
                replies: state
                    .replies_by_comment
                    .get(&comment.id)
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|rid| state.replies.get(rid))
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(Some(PostDetail {
            post: post.clone(),
            comments,
        }))
    }

    async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .post_order
            .iter()
            .rev()
            .filter_map(|id| state.posts.get(id))
            .cloned()
            .collect())
    }

    async fn post_exists(&self, id: u64) -> Result<bool, DomainError> {
        Ok(self.state.read().await.posts.contains_key(&id))
    }

    async fn comment_exists(&self, id: u64) -> Result<bool, DomainError> {
        Ok(self.state.read().await.comments.contains_key(&id))
    }

    async fn delete_post(&self, id: u64, supplied_secret: &str) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get(&id) else {
            return Err(DomainError::PostNotFound(id));
        };
        if !ownership::authorize(post.secret.as_deref(), supplied_secret) {
            return Err(DomainError::WrongSecret);
        }
        state.posts.remove(&id);
        state.post_order.retain(|pid| *pid != id);
        let comment_ids = state.comments_by_post.remove(&id).unwrap_or_default();
        for cid in comment_ids {
            state.comments.remove(&cid);
            for rid in state.replies_by_comment.remove(&cid).unwrap_or_default() {
                state.replies.remove(&rid);
            }
        }
        info!(post_id = id, "post deleted with descendants");
        Ok(())
    }
}
