//! Room (duel) engine: owns the live registry of two-player matches and
//! drives their state machine end to end — create, submit, forfeit, timeout,
//! rejoin, status, and the one-shot settlement that computes rating changes
//! and broadcasts the final result. Mirrors the teacher's pattern of keeping
//! per-resource state behind a lock in a shared map, with cancellable
//! `tokio::task::JoinHandle`s for scheduled work.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::evaluator::Evaluator;
use crate::models::problem::Problem;
use crate::models::room::{Room, RoomStatus, RoomUser, SubmissionStatus};
use crate::pubsub::PubSub;
use crate::rating::{self, DuelOutcome};
use crate::store::Store;
use crate::validation;

/// Match duration before an unresolved room is settled by timeout.
pub const ROOM_DURATION_SECS: i64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct NewPlayer {
    pub user_id: Uuid,
    pub username: String,
    pub rating: i32,
    pub games_played: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettlementReason {
    AllSubmitted,
    Forfeit,
    Timeout,
}

impl SettlementReason {
    fn as_str(self) -> &'static str {
        match self {
            SettlementReason::AllSubmitted => "allSubmitted",
            SettlementReason::Forfeit => "forfeit",
            SettlementReason::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub old_rating: i32,
    pub new_rating: i32,
    pub rating_change: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchFinished {
    pub room_id: Uuid,
    pub reason: String,
    pub users: Vec<RoomUser>,
    pub winner: Option<Uuid>,
    pub is_draw: bool,
    pub rating_changes: HashMap<Uuid, RatingChange>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: Uuid,
    pub problem_id: String,
    pub room_status: RoomStatus,
    pub users: Vec<RoomUser>,
    pub is_active: bool,
    pub remaining_time_ms: i64,
}

/// Returned by `create` so the caller (the session gateway) can push
/// `matchFound` directly to both players' sessions -- neither has subscribed
/// to the room's broadcast channel yet, so publishing it through `PubSub`
/// here would be silently dropped for both of them.
pub struct CreatedRoom {
    pub room_id: Uuid,
    pub problem: Problem,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

struct RoomEntry {
    room: Room,
    ends_at: DateTime<Utc>,
    timer: Option<JoinHandle<()>>,
    games_played: HashMap<Uuid, u32>,
}

pub struct RoomEngine {
    store: Arc<dyn Store>,
    pubsub: Arc<dyn PubSub>,
    clock: Arc<dyn Clock>,
    evaluator: Arc<dyn Evaluator>,
    rooms: RwLock<HashMap<Uuid, Arc<Mutex<RoomEntry>>>>,
    /// Set once by `new()` so the room timeout can hold its own `Arc` without
    /// every method needing an `Arc<Self>` receiver.
    self_weak: OnceLock<Weak<RoomEngine>>,
}

impl RoomEngine {
    pub fn new(
        store: Arc<dyn Store>,
        pubsub: Arc<dyn PubSub>,
        clock: Arc<dyn Clock>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Arc<Self> {
        let engine = Arc::new(Self {
            store,
            pubsub,
            clock,
            evaluator,
            rooms: RwLock::new(HashMap::new()),
            self_weak: OnceLock::new(),
        });
        let _ = engine.self_weak.set(Arc::downgrade(&engine));
        engine
    }

    pub async fn create(&self, a: NewPlayer, b: NewPlayer) -> AppResult<CreatedRoom> {
        let problem = self
            .store
            .random_problem()
            .await?
            .ok_or_else(|| AppError::not_found("no problems available"))?;

        let room_id = Uuid::new_v4();
        let now = self.clock.now();
        let room = Room::new(
            room_id,
            problem.id.clone(),
            RoomUser::new(a.user_id, a.username.clone(), a.rating),
            RoomUser::new(b.user_id, b.username.clone(), b.rating),
            now,
        );
        let ends_at = now + ChronoDuration::seconds(ROOM_DURATION_SECS);

        let mut games_played = HashMap::new();
        games_played.insert(a.user_id, a.games_played);
        games_played.insert(b.user_id, b.games_played);

        let entry = Arc::new(Mutex::new(RoomEntry {
            room,
            ends_at,
            timer: None,
            games_played,
        }));
        self.rooms.write().await.insert(room_id, entry.clone());
        entry.lock().await.timer = Some(self.spawn_timeout(room_id, ROOM_DURATION_SECS));

        tracing::info!(room_id = %room_id, problem_id = %problem.id, "room created");

        // `matchFound` is not published through `PubSub` here: neither player
        // has subscribed to this room's broadcast channel yet (that happens
        // after `create` returns), so a `broadcast` publish this early would
        // be silently dropped for both of them. The caller pushes it directly
        // to each player's session instead, once it has both `SessionHandle`s.
        Ok(CreatedRoom { room_id, problem, started_at: now, ends_at })
    }

    pub async fn submit(
        &self,
        room_id: Uuid,
        user_id: Uuid,
        code: &str,
        language: &str,
    ) -> AppResult<(i64, i32)> {
        let language = validation::validate_language(language)?;
        validation::validate_code(code)?;

        let entry = self.room_entry(room_id).await?;

        let problem_id = {
            let guard = entry.lock().await;
            if guard.room.room_status != RoomStatus::Live {
                return Err(AppError::conflict("room is not live"));
            }
            let user = guard
                .room
                .user(user_id)
                .ok_or_else(|| AppError::forbidden("not a member of this room"))?;
            if user.submission_status != SubmissionStatus::Pending {
                return Err(AppError::conflict("already submitted"));
            }
            guard.room.problem_id.clone()
        };
        self.publish(room_id, "userSubmitting", &serde_json::json!({ "userId": user_id }));

        // Long-running: the room lock must not be held across this call.
        let (score, passed) = self.evaluator.evaluate(&language, code, &problem_id).await?;

        let mut guard = entry.lock().await;
        if guard.room.room_status != RoomStatus::Live {
            return Err(AppError::conflict("room is not live"));
        }
        let now = self.clock.now();
        {
            let user = guard
                .room
                .user_mut(user_id)
                .ok_or_else(|| AppError::forbidden("not a member of this room"))?;
            if user.submission_status != SubmissionStatus::Pending {
                return Err(AppError::conflict("already submitted"));
            }
            user.score = score;
            user.submission_status = SubmissionStatus::Submitted;
            user.submission_time = Some(now);
        }

        tracing::info!(room_id = %room_id, user_id = %user_id, score, "solution submitted");
        self.publish(room_id, "scoreUpdate", &guard.room.users.to_vec());
        self.publish(
            room_id,
            "submissionUpdate",
            &serde_json::json!({ "userId": user_id, "score": score, "passedTestcases": passed }),
        );

        if guard.room.all_resolved() {
            self.settle(&mut guard, room_id, SettlementReason::AllSubmitted).await;
        }

        Ok((score, passed))
    }

    pub async fn forfeit(&self, room_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let entry = self.room_entry(room_id).await?;
        let mut guard = entry.lock().await;
        if guard.room.room_status != RoomStatus::Live {
            return Ok(());
        }

        {
            let user = guard
                .room
                .user_mut(user_id)
                .ok_or_else(|| AppError::forbidden("not a member of this room"))?;
            if user.submission_status == SubmissionStatus::Forfeited {
                return Ok(());
            }
            user.submission_status = SubmissionStatus::Forfeited;
            user.score = 0;
        }
        self.publish(room_id, "opponentLeft", &serde_json::json!({ "userId": user_id }));

        let remaining = guard
            .room
            .users
            .iter()
            .filter(|u| u.submission_status != SubmissionStatus::Forfeited)
            .count();
        if remaining <= 1 {
            self.settle(&mut guard, room_id, SettlementReason::Forfeit).await;
        }
        Ok(())
    }

    /// No-op if the room already settled by the time the timer fires.
    pub async fn timeout(&self, room_id: Uuid) -> AppResult<()> {
        let entry = match self.rooms.read().await.get(&room_id).cloned() {
            Some(entry) => entry,
            None => return Ok(()),
        };
        let mut guard = entry.lock().await;
        if guard.room.room_status != RoomStatus::Live {
            return Ok(());
        }
        self.settle(&mut guard, room_id, SettlementReason::Timeout).await;
        Ok(())
    }

    pub async fn rejoin(&self, room_id: Uuid, user_id: Uuid) -> AppResult<RoomSnapshot> {
        let entry = self.room_entry(room_id).await?;
        let guard = entry.lock().await;
        if !guard.room.is_active || !guard.room.contains(user_id) {
            return Err(AppError::forbidden("cannot rejoin this room"));
        }
        Ok(self.snapshot(&guard))
    }

    pub async fn status(&self, room_id: Uuid) -> AppResult<RoomSnapshot> {
        let entry = self.room_entry(room_id).await?;
        let guard = entry.lock().await;
        Ok(self.snapshot(&guard))
    }

    pub async fn active_matches(&self, user_id: Uuid) -> Vec<RoomSnapshot> {
        let rooms: Vec<_> = self.rooms.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for entry in rooms {
            let guard = entry.lock().await;
            if guard.room.is_active && guard.room.contains(user_id) {
                out.push(self.snapshot(&guard));
            }
        }
        out
    }

    pub fn subscribe(&self, room_id: Uuid) -> broadcast::Receiver<String> {
        self.pubsub.subscribe(room_id)
    }

    /// Best-effort chat relay (section 4.E `sendMessage`). Rejects senders
    /// who aren't a member of the room; does not touch submission state.
    pub async fn send_chat(&self, room_id: Uuid, user_id: Uuid, username: &str, message: &str) -> AppResult<()> {
        let entry = self.room_entry(room_id).await?;
        let guard = entry.lock().await;
        if !guard.room.contains(user_id) {
            return Err(AppError::forbidden("not a member of this room"));
        }
        drop(guard);
        self.publish(
            room_id,
            "newMessage",
            &serde_json::json!({ "userId": user_id, "username": username, "message": message }),
        );
        Ok(())
    }

    /// Called when a session's socket drops. Tells every still-active room
    /// this user belongs to that they went away, without forfeiting — the
    /// room stays live until an explicit `leaveMatch` or the timeout fires.
    pub async fn notify_disconnect(&self, user_id: Uuid) {
        let rooms: Vec<_> = self.rooms.read().await.values().cloned().collect();
        for entry in rooms {
            let guard = entry.lock().await;
            if guard.room.is_active && guard.room.contains(user_id) {
                let room_id = guard.room.room_id;
                drop(guard);
                self.publish(
                    room_id,
                    "opponentDisconnected",
                    &serde_json::json!({ "userId": user_id, "temporary": true }),
                );
            }
        }
    }

    async fn room_entry(&self, room_id: Uuid) -> AppResult<Arc<Mutex<RoomEntry>>> {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("room not found"))
    }

    fn snapshot(&self, entry: &RoomEntry) -> RoomSnapshot {
        let remaining = (entry.ends_at - self.clock.now())
            .num_milliseconds()
            .max(0);
        RoomSnapshot {
            room_id: entry.room.room_id,
            problem_id: entry.room.problem_id.clone(),
            room_status: entry.room.room_status,
            users: entry.room.users.to_vec(),
            is_active: entry.room.is_active,
            remaining_time_ms: remaining,
        }
    }

    /// Matches the session gateway's outbound push envelope (section 4.E):
    /// `{type:"event", event, data}`.
    fn publish(&self, room_id: Uuid, event: &str, data: &impl Serialize) {
        let envelope = serde_json::json!({ "type": "event", "event": event, "data": data });
        if let Ok(text) = serde_json::to_string(&envelope) {
            self.pubsub.publish(room_id, text);
        }
    }

    fn spawn_timeout(&self, room_id: Uuid, secs: i64) -> JoinHandle<()> {
        let engine = self
            .self_weak
            .get()
            .and_then(Weak::upgrade)
            .expect("RoomEngine must be constructed via RoomEngine::new");
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(secs.max(0) as u64)).await;
            if let Err(err) = engine.timeout(room_id).await {
                tracing::warn!(room_id = %room_id, error = %err, "room timeout settlement failed");
            }
        })
    }

    /// Single atomic settlement. Caller already holds `entry`'s lock, so two
    /// racing triggers (e.g. a final submit and a firing timer) can never
    /// both observe `Live` and double-settle.
    async fn settle(&self, entry: &mut RoomEntry, room_id: Uuid, reason: SettlementReason) {
        if let Some(timer) = entry.timer.take() {
            timer.abort();
        }

        let (outcome_a, is_draw, winner) = settlement_outcome(&entry.room, reason);
        let a = entry.room.users[0].clone();
        let b = entry.room.users[1].clone();
        let games_a = entry.games_played.get(&a.user_id).copied().unwrap_or(0);
        let games_b = entry.games_played.get(&b.user_id).copied().unwrap_or(0);
        let (new_rating_a, new_rating_b) =
            rating::apply_duel(a.rating, games_a, b.rating, games_b, outcome_a);

        let store_a = self.store.clone();
        let store_b = self.store.clone();
        let (res_a, res_b) = tokio::join!(
            store_a.update_user_rating(a.user_id, new_rating_a),
            store_b.update_user_rating(b.user_id, new_rating_b),
        );
        if let Err(err) = res_a {
            tracing::error!(room_id = %room_id, user_id = %a.user_id, error = %err, "rating write failed during settlement");
        }
        if let Err(err) = res_b {
            tracing::error!(room_id = %room_id, user_id = %b.user_id, error = %err, "rating write failed during settlement");
        }

        entry.room.room_status = RoomStatus::Completed;
        entry.room.is_active = false;

        let mut rating_changes = HashMap::new();
        rating_changes.insert(
            a.user_id,
            RatingChange { old_rating: a.rating, new_rating: new_rating_a, rating_change: new_rating_a - a.rating },
        );
        rating_changes.insert(
            b.user_id,
            RatingChange { old_rating: b.rating, new_rating: new_rating_b, rating_change: new_rating_b - b.rating },
        );

        tracing::info!(room_id = %room_id, reason = reason.as_str(), "room settled");
        self.publish(
            room_id,
            "matchFinished",
            &MatchFinished {
                room_id,
                reason: reason.as_str().to_string(),
                users: sorted_users(&entry.room),
                winner,
                is_draw,
                rating_changes,
            },
        );
    }
}

fn sorted_users(room: &Room) -> Vec<RoomUser> {
    let mut users = room.users.to_vec();
    users.sort_by(|a, b| {
        b.score.cmp(&a.score).then_with(|| match (a.submission_time, b.submission_time) {
            (Some(ta), Some(tb)) => ta.cmp(&tb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
    });
    users
}

/// Win/loss/draw for `users[0]`, plus the draw flag and winner id, given the
/// reason settlement was triggered. Forfeit always hands the win to whichever
/// side did not forfeit, regardless of scores; every other reason compares scores.
fn settlement_outcome(room: &Room, reason: SettlementReason) -> (DuelOutcome, bool, Option<Uuid>) {
    let a = &room.users[0];
    let b = &room.users[1];

    if reason == SettlementReason::Forfeit {
        let a_forfeited = a.submission_status == SubmissionStatus::Forfeited;
        let b_forfeited = b.submission_status == SubmissionStatus::Forfeited;
        return match (a_forfeited, b_forfeited) {
            (true, true) => (DuelOutcome::Draw, true, None),
            (true, false) => (DuelOutcome::Loss, false, Some(b.user_id)),
            (false, true) => (DuelOutcome::Win, false, Some(a.user_id)),
            (false, false) => (DuelOutcome::Draw, true, None),
        };
    }

    match a.score.cmp(&b.score) {
        Ordering::Equal => (DuelOutcome::Draw, true, None),
        Ordering::Greater => (DuelOutcome::Win, false, Some(a.user_id)),
        Ordering::Less => (DuelOutcome::Loss, false, Some(b.user_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::evaluator::FixedEvaluator;
    use crate::models::problem::{Difficulty, Problem};
    use crate::pubsub::BroadcastPubSub;
    use crate::store::memory::InMemoryStore;

    async fn engine_with_problem(score: i64, passed: i32) -> (Arc<RoomEngine>, Arc<InMemoryStore>, Arc<FixedClock>) {
        let store = Arc::new(InMemoryStore::new());
        store
            .seed_problem(Problem {
                id: "two-sum".into(),
                title: "Two Sum".into(),
                description: "d".into(),
                difficulty: Difficulty::Easy,
                examples: vec![],
                constraints: vec![],
                test_cases: vec![],
                canonical_solution: None,
                stored_max_score: 100,
            })
            .await;
        let clock = Arc::new(FixedClock::new("2026-01-01T00:00:00Z".parse().unwrap()));
        let pubsub = BroadcastPubSub::new();
        let evaluator: Arc<dyn Evaluator> = Arc::new(FixedEvaluator { score, passed });
        let engine = RoomEngine::new(store.clone(), pubsub, clock.clone(), evaluator);
        (engine, store, clock)
    }

    fn players() -> (NewPlayer, NewPlayer) {
        (
            NewPlayer { user_id: Uuid::new_v4(), username: "alice".into(), rating: 1000, games_played: 40 },
            NewPlayer { user_id: Uuid::new_v4(), username: "bob".into(), rating: 1000, games_played: 40 },
        )
    }

    #[tokio::test]
    async fn create_allocates_a_live_room_with_both_users() {
        let (engine, _store, _clock) = engine_with_problem(0, 0).await;
        let (a, b) = players();
        let created = engine.create(a.clone(), b.clone()).await.unwrap();

        let snapshot = engine.status(created.room_id).await.unwrap();
        assert_eq!(snapshot.room_status, RoomStatus::Live);
        assert!(snapshot.is_active);
        assert_eq!(snapshot.users.len(), 2);
        assert_eq!(snapshot.remaining_time_ms, ROOM_DURATION_SECS * 1000);
    }

    // Regression: `create` must hand the caller enough to push `matchFound`
    // directly to each session (problem, startedAt, endsAt) instead of
    // publishing over the room's broadcast channel before anyone subscribes.
    #[tokio::test]
    async fn create_returns_the_problem_and_timing_for_a_direct_push() {
        let (engine, _store, clock) = engine_with_problem(0, 0).await;
        let (a, b) = players();
        let created = engine.create(a.clone(), b.clone()).await.unwrap();

        assert_eq!(created.problem.id, "two-sum");
        assert_eq!(created.started_at, clock.now());
        assert_eq!(created.ends_at, clock.now() + ChronoDuration::seconds(ROOM_DURATION_SECS));
    }

    #[tokio::test]
    async fn submit_moves_pending_to_submitted_and_settles_once_both_resolve() {
        let (engine, store, _clock) = engine_with_problem(80, 4).await;
        let (a, b) = players();
        store.seed_user(crate::models::user::User::new(a.user_id, &a.username)).await;
        store.seed_user(crate::models::user::User::new(b.user_id, &b.username)).await;
        let room_id = engine.create(a.clone(), b.clone()).await.unwrap().room_id;

        let mut rx = engine.subscribe(room_id);

        let (score, passed) = engine.submit(room_id, a.user_id, "print(1)", "python").await.unwrap();
        assert_eq!(score, 80);
        assert_eq!(passed, 4);

        let snapshot = engine.status(room_id).await.unwrap();
        assert_eq!(snapshot.room_status, RoomStatus::Live);

        engine.submit(room_id, b.user_id, "print(1)", "python").await.unwrap();

        let snapshot = engine.status(room_id).await.unwrap();
        assert_eq!(snapshot.room_status, RoomStatus::Completed);
        assert!(!snapshot.is_active);

        // Equal scores from both sides -> draw -> unchanged rating.
        let updated_a = store.get_user(a.user_id).await.unwrap();
        assert_eq!(updated_a.rating, 1000);

        let mut finished_count = 0;
        while let Ok(msg) = rx.try_recv() {
            if msg.contains("matchFinished") {
                finished_count += 1;
            }
        }
        assert_eq!(finished_count, 1);
    }

    #[tokio::test]
    async fn resubmitting_after_submission_is_rejected() {
        let (engine, store, _clock) = engine_with_problem(50, 2).await;
        let (a, b) = players();
        store.seed_user(crate::models::user::User::new(a.user_id, &a.username)).await;
        store.seed_user(crate::models::user::User::new(b.user_id, &b.username)).await;
        let room_id = engine.create(a.clone(), b.clone()).await.unwrap().room_id;

        engine.submit(room_id, a.user_id, "code", "python").await.unwrap();
        let second = engine.submit(room_id, a.user_id, "code", "python").await;
        assert!(second.is_err());
    }

    // S3: X(1000) vs Y(1000), both established (<1200 so K=40 regardless of
    // games played); X forfeits. Y wins +20, X loses -20.
    #[tokio::test]
    async fn forfeit_forces_the_remaining_player_to_win() {
        let (engine, store, _clock) = engine_with_problem(0, 0).await;
        let (x, y) = players();
        store.seed_user(crate::models::user::User::new(x.user_id, &x.username)).await;
        store.seed_user(crate::models::user::User::new(y.user_id, &y.username)).await;
        let room_id = engine.create(x.clone(), y.clone()).await.unwrap().room_id;

        engine.forfeit(room_id, x.user_id).await.unwrap();

        let snapshot = engine.status(room_id).await.unwrap();
        assert_eq!(snapshot.room_status, RoomStatus::Completed);

        let updated_x = store.get_user(x.user_id).await.unwrap();
        let updated_y = store.get_user(y.user_id).await.unwrap();
        assert_eq!(updated_x.rating - 1000, -20);
        assert_eq!(updated_y.rating - 1000, 20);
    }

    #[tokio::test]
    async fn forfeit_is_a_noop_once_the_room_is_already_completed() {
        let (engine, store, _clock) = engine_with_problem(0, 0).await;
        let (x, y) = players();
        store.seed_user(crate::models::user::User::new(x.user_id, &x.username)).await;
        store.seed_user(crate::models::user::User::new(y.user_id, &y.username)).await;
        let room_id = engine.create(x.clone(), y.clone()).await.unwrap().room_id;

        engine.forfeit(room_id, x.user_id).await.unwrap();
        // Second forfeit (e.g. a racing disconnect) must not re-settle or error.
        engine.forfeit(room_id, y.user_id).await.unwrap();

        let updated_y = store.get_user(y.user_id).await.unwrap();
        assert_eq!(updated_y.rating - 1000, 20);
    }

    #[tokio::test]
    async fn timeout_is_idempotent_once_settled() {
        let (engine, store, _clock) = engine_with_problem(0, 0).await;
        let (a, b) = players();
        store.seed_user(crate::models::user::User::new(a.user_id, &a.username)).await;
        store.seed_user(crate::models::user::User::new(b.user_id, &b.username)).await;
        let room_id = engine.create(a.clone(), b.clone()).await.unwrap().room_id;

        engine.timeout(room_id).await.unwrap();
        let after_first = store.get_user(a.user_id).await.unwrap().rating;
        engine.timeout(room_id).await.unwrap();
        let after_second = store.get_user(a.user_id).await.unwrap().rating;
        assert_eq!(after_first, after_second);
    }

    #[tokio::test]
    async fn rejoin_returns_a_snapshot_without_mutating_room_state() {
        let (engine, _store, _clock) = engine_with_problem(0, 0).await;
        let (a, b) = players();
        let room_id = engine.create(a.clone(), b.clone()).await.unwrap().room_id;

        let first = engine.rejoin(room_id, a.user_id).await.unwrap();
        let second = engine.rejoin(room_id, a.user_id).await.unwrap();
        assert_eq!(first.room_status, second.room_status);
        assert_eq!(first.users.len(), second.users.len());

        let outsider = Uuid::new_v4();
        assert!(engine.rejoin(room_id, outsider).await.is_err());
    }
}
