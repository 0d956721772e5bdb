use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::error::DomainError;

/// Routed actions the limiter distinguishes. Anything not in the
/// configured table falls back to the default limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewIndex,
    ViewPost,
    CreatePost,
    AddComment,
    AddReply,
    DeletePost,
    ViewMedia,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::ViewIndex => "view_index",
            Action::ViewPost => "view_post",
            Action::CreatePost => "create_post",
            Action::AddComment => "add_comment",
            Action::AddReply => "add_reply",
            Action::DeletePost => "delete_post",
            Action::ViewMedia => "view_media",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimits {
    per_minute: HashMap<Action, u32>,
    default_per_minute: u32,
}

impl Default for RateLimits {
    fn default() -> Self {
        let per_minute = HashMap::from([
            (Action::ViewIndex, 10),
            (Action::ViewPost, 10),
            (Action::CreatePost, 3),
            (Action::AddComment, 5),
            (Action::AddReply, 5),
        ]);
        Self {
            per_minute,
            default_per_minute: 10,
        }
    }
}

impl RateLimits {
    pub fn limit_for(&self, action: Action) -> u32 {
        self.per_minute
            .get(&action)
            .copied()
            .unwrap_or(self.default_per_minute)
    }
}

struct Bucket {
    window: i64,
    count: u32,
}

/// Fixed one-minute buckets per (client identity, action). Identity is
/// the connection peer address, so the limiter is trivially bypassable by
/// spoofing; that is an accepted weakness of the board, not a bug.
pub struct RateLimiter {
    limits: RateLimits,
    enabled: bool,
    buckets: Mutex<HashMap<(String, Action), Bucket>>,
}

impl RateLimiter {
    pub fn new(limits: RateLimits, enabled: bool) -> Self {
        Self {
            limits,
            enabled,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub async fn check(&self, identity: &str, action: Action) -> Result<(), DomainError> {
        self.check_at(identity, action, Utc::now()).await
    }

    /// Timestamp-taking variant so the window can be pinned in tests.
    pub async fn check_at(
        &self,
        identity: &str,
        action: Action,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.enabled {
            return Ok(());
        }
        let minute = now.timestamp().div_euclid(60);
        let limit = self.limits.limit_for(action);

        let mut buckets = self.buckets.lock().await;
        // stale buckets never count again, drop them so the map cannot
        // grow without bound across distinct client addresses
        buckets.retain(|_, bucket| bucket.window == minute);
        let bucket = buckets
            .entry((identity.to_owned(), action))
            .or_insert(Bucket { window: minute, count: 0 });
        if bucket.count >= limit {
            return Err(DomainError::RateLimited(action.as_str()));
        }
        bucket.count += 1;
        Ok(())
    }
}
