use std::collections::HashMap;

use tokio::sync::Mutex;

/// Per-resource view counts, process-lifetime only; everything resets on
/// restart. Increments are serialized by the mutex so concurrent viewers
/// never lose an update.
#[derive(Default)]
pub struct ViewCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl ViewCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lazily initialises the key and returns the incremented count.
    pub async fn increment(&self, resource: &str) -> u64 {
        let mut counts = self.counts.lock().await;
        let count = counts.entry(resource.to_owned()).or_insert(0);
        *count += 1;
        *count
    }

    pub async fn get(&self, resource: &str) -> u64 {
        self.counts.lock().await.get(resource).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn first_view_counts_one() {
        let views = ViewCounter::new();
        assert_eq!(views.get("v.mp4").await, 0);
        assert_eq!(views.increment("v.mp4").await, 1);
        assert_eq!(views.increment("v.mp4").await, 2);
        assert_eq!(views.get("v.mp4").await, 2);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let views = ViewCounter::new();
        views.increment("a").await;
        assert_eq!(views.get("b").await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_lose_nothing() {
        let views = Arc::new(ViewCounter::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let views = Arc::clone(&views);
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    views.increment("popular.mp4").await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(views.get("popular.mp4").await, 400);
    }
}
