//! Pure, deterministic rating math (spec 4.A). No I/O, no async: every
//! function here is a straight translation of the formulas so it can be
//! exhaustively unit tested without a `Store` or an event loop.

use crate::models::user::{MAX_RATING, MIN_RATING};

/// Outcome of a duel from the perspective of the rating-change computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelOutcome {
    Win,
    Draw,
    Loss,
}

impl DuelOutcome {
    fn actual_score(self) -> f64 {
        match self {
            DuelOutcome::Win => 1.0,
            DuelOutcome::Draw => 0.5,
            DuelOutcome::Loss => 0.0,
        }
    }
}

/// Elo expected score for player A against player B.
pub fn expected_score(rating_a: i32, rating_b: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) as f64 / 400.0))
}

/// Duel K-factor: 40 if games<30 or rating<1200; 10 if rating>=2000; else 20.
pub fn duel_k_factor(rating: i32, games_played: u32) -> f64 {
    if games_played < 30 || rating < 1200 {
        40.0
    } else if rating >= 2000 {
        10.0
    } else {
        20.0
    }
}

/// Rating change for one side of a duel, clamped to +-50 (section 4.A).
pub fn duel_rating_change(rating: i32, opponent_rating: i32, outcome: DuelOutcome, games_played: u32) -> i32 {
    let k = duel_k_factor(rating, games_played);
    let expected = expected_score(rating, opponent_rating);
    let delta = (k * (outcome.actual_score() - expected)).round() as i32;
    delta.clamp(-50, 50)
}

pub fn clamp_rating(rating: i32) -> i32 {
    rating.clamp(MIN_RATING, MAX_RATING)
}

/// The two new ratings for a duel between A and B, given A's outcome.
pub fn apply_duel(
    rating_a: i32,
    games_a: u32,
    rating_b: i32,
    games_b: u32,
    outcome_a: DuelOutcome,
) -> (i32, i32) {
    let outcome_b = match outcome_a {
        DuelOutcome::Win => DuelOutcome::Loss,
        DuelOutcome::Loss => DuelOutcome::Win,
        DuelOutcome::Draw => DuelOutcome::Draw,
    };
    let delta_a = duel_rating_change(rating_a, rating_b, outcome_a, games_a);
    let delta_b = duel_rating_change(rating_b, rating_a, outcome_b, games_b);
    (
        clamp_rating(rating_a + delta_a),
        clamp_rating(rating_b + delta_b),
    )
}

/// One entrant in a contest-wide rating recompute.
#[derive(Debug, Clone, Copy)]
pub struct ContestEntrant {
    pub rating: i32,
    pub games_played: u32,
    pub rank: usize,
}

fn contest_k_factor(rating: i32, games_played: u32) -> f64 {
    if games_played < 6 {
        40.0
    } else if rating < 1400 {
        32.0
    } else if rating < 1800 {
        24.0
    } else if rating < 2200 {
        16.0
    } else {
        8.0
    }
}

/// Contest rating delta for one entrant among the full field (section 4.A).
/// `field` must contain every entrant including this one; `index` identifies
/// which entry the delta is computed for.
pub fn contest_rating_change(field: &[ContestEntrant], index: usize) -> i32 {
    let me = field[index];
    let expected_rank: f64 = 1.0
        + field
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .map(|(_, other)| expected_score(other.rating, me.rating))
            .sum::<f64>();

    let factor = (expected_rank - me.rank as f64) / expected_rank;
    let k = contest_k_factor(me.rating, me.games_played);
    let mut delta = (k * factor).round() as i32;

    if me.games_played < 6 && delta > 0 {
        delta = ((delta as f64) * 1.2).round() as i32;
    }

    delta.clamp(-100, 100)
}

pub fn contest_new_rating(rating: i32, delta: i32) -> i32 {
    (rating + delta).clamp(0, MAX_RATING)
}

/// Assigns 1-based ranks by score descending, stable on ties (section 4.A
/// tie-break note: rank assignment ties share rank only if chosen to; this
/// core keeps ranks dense and stable by original order, matching S6).
pub fn rank_by_score_desc<T, F: Fn(&T) -> i64>(items: &[T], score_of: F) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..items.len()).collect();
    indices.sort_by(|&a, &b| score_of(&items[b]).cmp(&score_of(&items[a])));
    indices
}
