//! Rewards and level accounting.
//!
//! Pure functions only. The game core calls [`reward_for`]; the progress store
//! calls [`apply_xp`] when it persists an award, so the level curve lives in
//! one place.

use super::Difficulty;
use crate::storage::PlayerProfile;

/// XP needed to go from level 1 to level 2.
pub const STARTING_XP_THRESHOLD: u32 = 100;

/// XP granted for solving a case of the given difficulty.
pub fn reward_for(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 50,
        Difficulty::Medium => 100,
        Difficulty::Hard => 200,
    }
}

/// Threshold for the level after one whose threshold was `current`.
///
/// Grows by half, rounded up.
pub fn next_threshold(current: u32) -> u32 {
    current
        .saturating_add(current / 2 + current % 2)
        .max(1)
}

/// Add `delta` XP to a profile, carrying over any level boundaries crossed.
///
/// Returns the updated profile and whether at least one level was gained.
/// `cases_solved` is left alone; the caller decides what counts as a solve.
pub fn apply_xp(profile: &PlayerProfile, delta: u32) -> (PlayerProfile, bool) {
    let mut updated = profile.clone();
    updated.current_xp = updated.current_xp.saturating_add(delta);
    updated.total_xp = updated.total_xp.saturating_add(u64::from(delta));

    while updated.current_xp >= updated.xp_to_next_level {
        updated.current_xp -= updated.xp_to_next_level;
        updated.level += 1;
        updated.xp_to_next_level = next_threshold(updated.xp_to_next_level);
    }

    let leveled_up = leveled_up(profile, &updated);
    (updated, leveled_up)
}

/// Whether `after` is at a higher level than `before`.
pub fn leveled_up(before: &PlayerProfile, after: &PlayerProfile) -> bool {
    after.level > before.level
}
