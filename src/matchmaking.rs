//! Matchmaking queue (section 4.B): an in-memory, rating-indexed waiting
//! set with a per-player deadline. `findMatch` only scans; callers own the
//! remove-and-create-room sequence under their own pairing mutex.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Rating window for `findMatch`: candidates within this distance are eligible (section 4.B).
pub const RATING_WINDOW: i32 = 200;
/// Matchmaking deadline before an unmatched player is evicted with a timeout event.
pub const MATCHMAKING_TIMEOUT_MS: i64 = 30_000;

#[derive(Debug, Clone)]
pub struct QueuedPlayer {
    pub user_id: Uuid,
    pub username: String,
    pub rating: i32,
    pub joined_at: DateTime<Utc>,
}

/// The matchmaking queue plus the deadline timer for each queued player.
/// The timer table lives alongside the queue (not a separate global) so
/// `remove` always cancels its own deadline in one place (section 9).
pub struct MatchmakingQueue {
    entries: RwLock<HashMap<Uuid, QueuedPlayer>>,
    deadlines: RwLock<HashMap<Uuid, JoinHandle<()>>>,
}

impl Default for MatchmakingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchmakingQueue {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            deadlines: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts `p`, replacing and cancelling any prior deadline for the same user.
    pub async fn add(&self, player: QueuedPlayer, deadline: JoinHandle<()>) {
        if let Some(old) = self.deadlines.write().await.insert(player.user_id, deadline) {
            old.abort();
        }
        self.entries.write().await.insert(player.user_id, player);
    }

    /// Removes a player, cancelling their deadline. Returns the entry if present.
    pub async fn remove(&self, user_id: Uuid) -> Option<QueuedPlayer> {
        if let Some(handle) = self.deadlines.write().await.remove(&user_id) {
            handle.abort();
        }
        self.entries.write().await.remove(&user_id)
    }

    /// Scans for the closest-rated opponent within `RATING_WINDOW`, tie-broken
    /// by earliest `joined_at` (section 4.B, scenario S1). Does not remove it.
    pub async fn find_match(&self, candidate: &QueuedPlayer) -> Option<QueuedPlayer> {
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|p| p.user_id != candidate.user_id)
            .filter(|p| (p.rating - candidate.rating).abs() <= RATING_WINDOW)
            .min_by(|a, b| {
                let diff_a = (a.rating - candidate.rating).abs();
                let diff_b = (b.rating - candidate.rating).abs();
                diff_a.cmp(&diff_b).then(a.joined_at.cmp(&b.joined_at))
            })
            .cloned()
    }

    pub async fn size(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn has(&self, user_id: Uuid) -> bool {
        self.entries.read().await.contains_key(&user_id)
    }

    pub async fn get(&self, user_id: Uuid) -> Option<QueuedPlayer> {
        self.entries.read().await.get(&user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(user_id: Uuid, rating: i32, joined_at: DateTime<Utc>) -> QueuedPlayer {
        QueuedPlayer {
            user_id,
            username: format!("user-{}", user_id),
            rating,
            joined_at,
        }
    }

    fn noop_handle() -> JoinHandle<()> {
        tokio::spawn(async {})
    }

    #[tokio::test]
    async fn queue_uniqueness_after_add_remove_sequence() {
        let queue = MatchmakingQueue::new();
        let id = Uuid::new_v4();
        queue.add(player(id, 1000, Utc::now()), noop_handle()).await;
        queue.add(player(id, 1000, Utc::now()), noop_handle()).await;
        assert_eq!(queue.size().await, 1);
        queue.remove(id).await;
        assert_eq!(queue.size().await, 0);
    }

    // S1: Carol(1200, t2) must pair with Alice(1100, t0) over Bob(1300, t1) on tie-break.
    #[tokio::test]
    async fn scenario_s1_tie_break_by_earliest_joined_at() {
        let queue = MatchmakingQueue::new();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(1);

        let alice_id = Uuid::new_v4();
        let bob_id = Uuid::new_v4();
        queue.add(player(alice_id, 1100, t0), noop_handle()).await;
        queue.add(player(bob_id, 1300, t1), noop_handle()).await;

        let carol = player(Uuid::new_v4(), 1200, t1 + chrono::Duration::seconds(1));
        let opponent = queue.find_match(&carol).await.unwrap();
        assert_eq!(opponent.user_id, alice_id);
    }

    #[tokio::test]
    async fn find_match_respects_rating_window() {
        let queue = MatchmakingQueue::new();
        let far_id = Uuid::new_v4();
        queue.add(player(far_id, 1500, Utc::now()), noop_handle()).await;

        let seeker = player(Uuid::new_v4(), 1000, Utc::now());
        assert!(queue.find_match(&seeker).await.is_none());
    }

    #[tokio::test]
    async fn find_match_does_not_remove_candidates() {
        let queue = MatchmakingQueue::new();
        let opponent_id = Uuid::new_v4();
        queue.add(player(opponent_id, 1000, Utc::now()), noop_handle()).await;

        let seeker = player(Uuid::new_v4(), 1000, Utc::now());
        let found = queue.find_match(&seeker).await;
        assert!(found.is_some());
        assert_eq!(queue.size().await, 1);
    }

    #[tokio::test]
    async fn re_adding_the_same_user_cancels_the_prior_deadline() {
        let queue = MatchmakingQueue::new();
        let id = Uuid::new_v4();
        let first = noop_handle();
        queue.add(player(id, 1000, Utc::now()), first).await;
        queue.add(player(id, 1000, Utc::now()), noop_handle()).await;
        assert_eq!(queue.size().await, 1);
    }
}
