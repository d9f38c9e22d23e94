//! In-memory leaderboard repair.
//!
//! The leaderboard is an array in ascending rank order with `rank == index + 1`.
//! A score change can only put one entry out of place, so instead of
//! re-sorting the whole list the changed entry is walked up (promote) or down
//! (demote) past its neighbours, swapping one slot at a time. The cost is
//! proportional to the distance moved.

use pokewiki_types::LeaderboardEntry;

/// Apply one player's new point total to the leaderboard.
///
/// `user.points` must already hold the new total and `user.rank` the rank the
/// player had before the change (`None` if never placed). Returns the
/// repaired list and the player's corrected entry.
///
/// - An unplaced player is appended with rank `len + 1`.
/// - A one-entry list belonging to the player is replaced in place.
/// - Otherwise the player is promoted while strictly ahead of the
///   predecessor on points. If that moves them nowhere they are demoted
///   while strictly behind the successor. Ties never move.
///
/// The direction comes from the neighbours, not from the player's previous
/// points, so a player appended out of order is settled by whichever
/// update comes next.
///
/// The player is found at `rank - 1`; if that slot holds someone else (a stale
/// rank) the list is searched by name, and a player absent from the list is
/// appended as if new.
pub fn apply_score_update(
    mut list: Vec<LeaderboardEntry>,
    mut user: LeaderboardEntry,
) -> (Vec<LeaderboardEntry>, LeaderboardEntry) {
    let Some(index) = locate(&list, &user) else {
        user.rank = Some(rank_at(list.len()));
        list.push(user.clone());
        return (list, user);
    };

    if list.len() == 1 {
        user.rank = Some(1);
        list[0] = user.clone();
        return (list, user);
    }

    user.rank = Some(rank_at(index));
    list[index] = user;

    let mut settled = promote(&mut list, index);
    if settled == index {
        settled = demote(&mut list, index);
    }
    let user = list[settled].clone();
    (list, user)
}

fn locate(list: &[LeaderboardEntry], user: &LeaderboardEntry) -> Option<usize> {
    if let Some(rank) = user.rank {
        let index = (rank as usize).wrapping_sub(1);
        if list.get(index).is_some_and(|entry| entry.name == user.name) {
            return Some(index);
        }
    }
    list.iter().position(|entry| entry.name == user.name)
}

fn rank_at(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

fn swap_ranked(list: &mut [LeaderboardEntry], upper: usize) {
    list.swap(upper, upper + 1);
    list[upper].rank = Some(rank_at(upper));
    list[upper + 1].rank = Some(rank_at(upper + 1));
}

fn promote(list: &mut [LeaderboardEntry], mut index: usize) -> usize {
    while index > 0 && list[index].points > list[index - 1].points {
        swap_ranked(list, index - 1);
        index -= 1;
    }
    index
}

fn demote(list: &mut [LeaderboardEntry], mut index: usize) -> usize {
    while index + 1 < list.len() && list[index].points < list[index + 1].points {
        swap_ranked(list, index);
        index += 1;
    }
    index
}

/// A broken leaderboard invariant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LeaderboardViolation {
    #[error("entry {name} at position {position} has rank {rank:?}")]
    RankMismatch {
        name: String,
        position: usize,
        rank: Option<u32>,
    },

    #[error("{lower} ({lower_points}) is ranked above {higher} ({higher_points})")]
    OutOfOrder {
        lower: String,
        lower_points: i64,
        higher: String,
        higher_points: i64,
    },

    #[error("player {0} appears more than once")]
    DuplicateName(String),
}

/// Check the steady-state invariants: dense ranks `1..=len` in list order,
/// points non-increasing down the list, unique names.
pub fn check_leaderboard(list: &[LeaderboardEntry]) -> Result<(), LeaderboardViolation> {
    let mut names = std::collections::HashSet::with_capacity(list.len());
    for (position, entry) in list.iter().enumerate() {
        if entry.rank != Some(rank_at(position)) {
            return Err(LeaderboardViolation::RankMismatch {
                name: entry.name.clone(),
                position,
                rank: entry.rank,
            });
        }
        if !names.insert(entry.name.as_str()) {
            return Err(LeaderboardViolation::DuplicateName(entry.name.clone()));
        }
    }
    for pair in list.windows(2) {
        if pair[0].points < pair[1].points {
            return Err(LeaderboardViolation::OutOfOrder {
                lower: pair[0].name.clone(),
                lower_points: pair[0].points,
                higher: pair[1].name.clone(),
                higher_points: pair[1].points,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(name: &str, points: i64, rank: u32) -> LeaderboardEntry {
        LeaderboardEntry::new(name, points, Some(rank))
    }

    fn names(list: &[LeaderboardEntry]) -> Vec<&str> {
        list.iter().map(|e| e.name.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Placement of new and sole players
    // -----------------------------------------------------------------------

    #[test]
    fn new_player_is_appended() {
        let list = vec![entry("a", 100, 1), entry("b", 50, 2)];
        let (list, user) = apply_score_update(list, LeaderboardEntry::new("c", 500, None));
        assert_eq!(user.rank, Some(3));
        assert_eq!(names(&list), vec!["a", "b", "c"]);
        assert_eq!(list[2], user);
    }

    #[test]
    fn appended_player_settles_on_a_loss() {
        let list = vec![entry("a", 100, 1), entry("b", 50, 2)];
        let (list, c) = apply_score_update(list, LeaderboardEntry::new("c", 500, None));
        let (list, c) = apply_score_update(list, LeaderboardEntry::new("c", 450, c.rank));
        assert_eq!(c, entry("c", 450, 1));
        assert_eq!(names(&list), vec!["c", "a", "b"]);
        assert!(check_leaderboard(&list).is_ok());
    }

    #[test]
    fn appended_player_settles_on_a_small_gain() {
        let list = vec![entry("a", 100, 1), entry("b", 50, 2)];
        let (list, c) = apply_score_update(list, LeaderboardEntry::new("c", 70, None));
        let (list, c) = apply_score_update(list, LeaderboardEntry::new("c", 75, c.rank));
        assert_eq!(c, entry("c", 75, 2));
        assert_eq!(names(&list), vec!["a", "c", "b"]);
        assert!(check_leaderboard(&list).is_ok());
    }

    #[test]
    fn first_player_on_empty_board() {
        let (list, user) = apply_score_update(Vec::new(), LeaderboardEntry::unranked("ash"));
        assert_eq!(user.rank, Some(1));
        assert_eq!(list, vec![entry("ash", 0, 1)]);
    }

    #[test]
    fn sole_player_is_replaced() {
        let (list, user) = apply_score_update(vec![entry("ash", 100, 1)], entry("ash", 40, 1));
        assert_eq!(user, entry("ash", 40, 1));
        assert_eq!(list, vec![entry("ash", 40, 1)]);
    }

    #[test]
    fn sole_entry_of_someone_else_appends() {
        let (list, user) = apply_score_update(vec![entry("ash", 100, 1)], entry("gary", 10, 1));
        assert_eq!(user.rank, Some(2));
        assert_eq!(names(&list), vec!["ash", "gary"]);
    }

    // -----------------------------------------------------------------------
    // Promote / demote
    // -----------------------------------------------------------------------

    #[test]
    fn promote_past_one() {
        let list = vec![entry("A", 100, 1), entry("B", 0, 2)];
        let (list, user) = apply_score_update(list, entry("B", 200, 2));
        assert_eq!(list, vec![entry("B", 200, 1), entry("A", 100, 2)]);
        assert_eq!(user, entry("B", 200, 1));
    }

    #[test]
    fn demote_past_one() {
        let list = vec![entry("A", 100, 1), entry("B", 100, 2)];
        let (list, user) = apply_score_update(list, entry("A", 50, 1));
        assert_eq!(list, vec![entry("B", 100, 1), entry("A", 50, 2)]);
        assert_eq!(user, entry("A", 50, 2));
    }

    #[test]
    fn tie_on_promote_does_not_move() {
        let list = vec![entry("A", 100, 1), entry("B", 0, 2)];
        let (list, user) = apply_score_update(list, entry("B", 100, 2));
        assert_eq!(list, vec![entry("A", 100, 1), entry("B", 100, 2)]);
        assert_eq!(user.rank, Some(2));
    }

    #[test]
    fn tie_on_demote_does_not_move() {
        let list = vec![entry("A", 300, 1), entry("B", 200, 2), entry("C", 100, 3)];
        let (list, _) = apply_score_update(list, entry("A", 200, 1));
        assert_eq!(names(&list), vec!["A", "B", "C"]);
    }

    #[test]
    fn promote_across_several() {
        let list = vec![
            entry("a", 400, 1),
            entry("b", 300, 2),
            entry("c", 200, 3),
            entry("d", 100, 4),
        ];
        let (list, user) = apply_score_update(list, entry("d", 350, 4));
        assert_eq!(names(&list), vec!["a", "d", "b", "c"]);
        assert_eq!(user.rank, Some(2));
        assert!(check_leaderboard(&list).is_ok());
    }

    #[test]
    fn demote_across_several() {
        let list = vec![
            entry("a", 400, 1),
            entry("b", 300, 2),
            entry("c", 200, 3),
            entry("d", 100, 4),
        ];
        let (list, user) = apply_score_update(list, entry("a", 150, 1));
        assert_eq!(names(&list), vec!["b", "c", "a", "d"]);
        assert_eq!(user.rank, Some(3));
        assert!(check_leaderboard(&list).is_ok());
    }

    #[test]
    fn top_player_gaining_stays_first() {
        let list = vec![entry("a", 100, 1), entry("b", 50, 2)];
        let (list, user) = apply_score_update(list, entry("a", 1000, 1));
        assert_eq!(user.rank, Some(1));
        assert_eq!(names(&list), vec!["a", "b"]);
    }

    #[test]
    fn bottom_player_losing_stays_last() {
        let list = vec![entry("a", 100, 1), entry("b", 50, 2)];
        let (list, user) = apply_score_update(list, entry("b", -50, 2));
        assert_eq!(user.rank, Some(2));
        assert_eq!(list[1].points, -50);
    }

    #[test]
    fn promote_to_top() {
        let list = vec![entry("a", 300, 1), entry("b", 200, 2), entry("c", 100, 3)];
        let (list, user) = apply_score_update(list, entry("c", 301, 3));
        assert_eq!(names(&list), vec!["c", "a", "b"]);
        assert_eq!(user.rank, Some(1));
    }

    #[test]
    fn demote_to_bottom() {
        let list = vec![entry("a", 300, 1), entry("b", 200, 2), entry("c", 100, 3)];
        let (list, user) = apply_score_update(list, entry("a", 0, 1));
        assert_eq!(names(&list), vec!["b", "c", "a"]);
        assert_eq!(user.rank, Some(3));
    }

    #[test]
    fn unchanged_points_is_idempotent() {
        let list = vec![entry("a", 300, 1), entry("b", 200, 2), entry("c", 100, 3)];
        let (once, user) = apply_score_update(list.clone(), entry("b", 250, 2));
        let (twice, again) = apply_score_update(once.clone(), user.clone());
        assert_eq!(once, twice);
        assert_eq!(user, again);
    }

    #[test]
    fn stale_rank_falls_back_to_name() {
        let list = vec![entry("a", 300, 1), entry("b", 200, 2), entry("c", 100, 3)];
        let (list, user) = apply_score_update(list, entry("c", 250, 1));
        assert_eq!(names(&list), vec!["a", "c", "b"]);
        assert_eq!(user.rank, Some(2));
    }

    #[test]
    fn rank_zero_falls_back_to_name() {
        let list = vec![entry("a", 300, 1), entry("b", 200, 2)];
        let (list, user) = apply_score_update(list, LeaderboardEntry::new("b", 400, Some(0)));
        assert_eq!(names(&list), vec!["b", "a"]);
        assert_eq!(user.rank, Some(1));
    }

    #[test]
    fn unranked_but_listed_player_is_not_duplicated() {
        let list = vec![entry("a", 300, 1), entry("b", 200, 2)];
        let (list, _) = apply_score_update(list, LeaderboardEntry::new("b", 500, None));
        assert_eq!(names(&list), vec!["b", "a"]);
    }

    // -----------------------------------------------------------------------
    // Invariant checker
    // -----------------------------------------------------------------------

    #[test]
    fn check_detects_violations() {
        assert!(check_leaderboard(&[]).is_ok());
        assert!(matches!(
            check_leaderboard(&[entry("a", 1, 2)]),
            Err(LeaderboardViolation::RankMismatch { .. })
        ));
        assert!(matches!(
            check_leaderboard(&[entry("a", 1, 1), entry("b", 5, 2)]),
            Err(LeaderboardViolation::OutOfOrder { .. })
        ));
        assert!(matches!(
            check_leaderboard(&[entry("a", 5, 1), entry("a", 1, 2)]),
            Err(LeaderboardViolation::DuplicateName(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn steady_board(mut points: Vec<i64>) -> Vec<LeaderboardEntry> {
        points.sort_unstable_by(|a, b| b.cmp(a));
        points
            .into_iter()
            .enumerate()
            .map(|(i, p)| entry(&format!("p{i}"), p, rank_at(i)))
            .collect()
    }

    proptest! {
        #[test]
        fn update_restores_invariants(
            points in proptest::collection::vec(-500i64..5000, 1..40),
            pick in any::<prop::sample::Index>(),
            new_points in -500i64..5000,
        ) {
            let list = steady_board(points);
            let index = pick.index(list.len());
            let mut user = list[index].clone();
            user.points = new_points;

            let (updated, corrected) = apply_score_update(list.clone(), user);
            prop_assert_eq!(updated.len(), list.len());
            prop_assert!(check_leaderboard(&updated).is_ok());
            prop_assert_eq!(corrected.points, new_points);
            let at = corrected.rank.unwrap() as usize - 1;
            prop_assert_eq!(&updated[at], &corrected);
        }

        #[test]
        fn others_keep_relative_order(
            points in proptest::collection::vec(0i64..1000, 2..30),
            pick in any::<prop::sample::Index>(),
            new_points in 0i64..1000,
        ) {
            let list = steady_board(points);
            let index = pick.index(list.len());
            let mut user = list[index].clone();
            user.points = new_points;
            let moved = user.name.clone();

            let (updated, _) = apply_score_update(list.clone(), user);
            let before: Vec<_> = list.iter().filter(|e| e.name != moved).map(|e| &e.name).collect();
            let after: Vec<_> = updated.iter().filter(|e| e.name != moved).map(|e| &e.name).collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn new_player_lands_at_bottom(
            points in proptest::collection::vec(0i64..1000, 0..30),
            new_points in 0i64..1000,
        ) {
            let list = steady_board(points);
            let user = LeaderboardEntry::new("newcomer", new_points, None);
            let (updated, corrected) = apply_score_update(list.clone(), user);
            prop_assert_eq!(corrected.rank, Some(rank_at(list.len())));
            prop_assert_eq!(&updated[..list.len()], &list[..]);
        }

        #[test]
        fn appended_player_settles_on_next_update(
            points in proptest::collection::vec(-500i64..5000, 0..30),
            first in -500i64..5000,
            second in -500i64..5000,
        ) {
            let list = steady_board(points);
            let (placed, newcomer) = apply_score_update(list, LeaderboardEntry::new("newcomer", first, None));
            let user = LeaderboardEntry::new("newcomer", second, newcomer.rank);
            let (updated, corrected) = apply_score_update(placed, user);
            prop_assert!(check_leaderboard(&updated).is_ok());
            prop_assert_eq!(corrected.points, second);
        }

        #[test]
        fn settled_update_is_idempotent(
            points in proptest::collection::vec(0i64..1000, 1..30),
            pick in any::<prop::sample::Index>(),
            new_points in 0i64..1000,
        ) {
            let list = steady_board(points);
            let mut user = list[pick.index(list.len())].clone();
            user.points = new_points;
            let (once, settled) = apply_score_update(list, user);
            let (twice, again) = apply_score_update(once.clone(), settled.clone());
            prop_assert_eq!(once, twice);
            prop_assert_eq!(settled, again);
        }
    }
}
