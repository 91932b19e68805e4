//! Draw selector: eligibility, forced-winner queue and the winner pick.

use std::collections::{HashSet, VecDeque};

use crate::state::{
    entrant::{Entrant, WinnerRecord},
    random::RandomSource,
};

/// Region filter applied to the primary pool before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// Every entrant.
    #[default]
    All,
    /// Only entrants whose city is the designated region.
    RegionA,
    /// Only entrants whose city is not the designated region.
    RegionB,
}

impl DrawMode {
    /// Whether `entrant` passes the filter. Cities are compared ignoring case.
    pub fn admits(&self, entrant: &Entrant, region: &str) -> bool {
        let in_region = entrant.city.to_lowercase() == region.to_lowercase();
        match self {
            DrawMode::All => true,
            DrawMode::RegionA => in_region,
            DrawMode::RegionB => !in_region,
        }
    }
}

/// FIFO queue of pre-arranged winner names. One head is consumed per selection attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForcedWinnerQueue {
    names: VecDeque<String>,
}

impl ForcedWinnerQueue {
    /// Build a queue from names in order.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    /// Append a name at the back.
    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push_back(name.into());
    }

    /// Dequeue the head.
    pub fn pop(&mut self) -> Option<String> {
        self.names.pop_front()
    }

    /// Number of queued names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Queued names, head first.
    pub fn names(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}

/// Which rule produced the winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPath {
    /// The head of the forced-winner queue was eligible.
    Forced,
    /// Uniform pick among eligible entrants.
    Random,
    /// Nobody was eligible; uniform pick over the whole unfiltered source.
    Fallback,
}

/// Outcome of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The chosen entrant.
    pub winner: Entrant,
    /// How it was chosen.
    pub path: SelectionPath,
}

/// Entrants of `source` that passed `mode` and have not won yet.
pub fn eligible<'a>(
    source: &'a [Entrant],
    history: &[WinnerRecord],
    mode: DrawMode,
    region: &str,
) -> Vec<&'a Entrant> {
    let won: HashSet<&str> = history.iter().map(WinnerRecord::name).collect();
    source
        .iter()
        .filter(|entry| !won.contains(entry.name.as_str()))
        .filter(|entry| mode.admits(entry, region))
        .collect()
}

/// Pick the winner of one draw. Returns `None` only when `source` is empty.
///
/// An empty eligible set falls back to the whole unfiltered source, ignoring history,
/// even when other regions still hold entrants that never won. This keeps the show
/// going and matches the behaviour operators already rely on; the queue is left
/// untouched on that path.
pub fn select_winner<R: RandomSource>(
    source: &[Entrant],
    eligible: &[&Entrant],
    queue: &mut ForcedWinnerQueue,
    rng: &mut R,
) -> Option<Selection> {
    if source.is_empty() {
        return None;
    }

    if eligible.is_empty() {
        let winner = source[rng.next_index(source.len())].clone();
        return Some(Selection {
            winner,
            path: SelectionPath::Fallback,
        });
    }

    if let Some(candidate) = queue.pop() {
        if let Some(found) = eligible.iter().find(|entry| entry.name == candidate) {
            return Some(Selection {
                winner: (*found).clone(),
                path: SelectionPath::Forced,
            });
        }
    }

    let winner = eligible[rng.next_index(eligible.len())].clone();
    Some(Selection {
        winner,
        path: SelectionPath::Random,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::random::{ScriptedRandom, SeededRandom};

    fn pool() -> Vec<Entrant> {
        vec![
            Entrant::new("Alice", "Pune"),
            Entrant::new("Bob", "Mumbai"),
            Entrant::new("Carol", "PUNE"),
            Entrant::new("Dan", "Nagpur"),
        ]
    }

    fn won(names: &[&str]) -> Vec<WinnerRecord> {
        names
            .iter()
            .map(|name| WinnerRecord::now(Entrant::new(*name, "")))
            .collect()
    }

    fn names(list: &[&Entrant]) -> Vec<String> {
        list.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn region_filters_compare_cities_ignoring_case() {
        let source = pool();
        assert_eq!(
            names(&eligible(&source, &[], DrawMode::RegionA, "pune")),
            vec!["Alice", "Carol"]
        );
        assert_eq!(
            names(&eligible(&source, &[], DrawMode::RegionB, "Pune")),
            vec!["Bob", "Dan"]
        );
        assert_eq!(eligible(&source, &[], DrawMode::All, "pune").len(), 4);
    }

    #[test]
    fn past_winners_are_not_eligible() {
        let source = pool();
        let history = won(&["Alice", "Dan"]);
        assert_eq!(
            names(&eligible(&source, &history, DrawMode::All, "pune")),
            vec!["Bob", "Carol"]
        );
    }

    #[test]
    fn random_pick_never_returns_a_past_winner() {
        let source = pool();
        let history = won(&["Alice", "Bob"]);
        let mut rng = SeededRandom::new(9);
        for _ in 0..50 {
            let pool = eligible(&source, &history, DrawMode::All, "pune");
            let selection =
                select_winner(&source, &pool, &mut ForcedWinnerQueue::default(), &mut rng)
                    .unwrap();
            assert_eq!(selection.path, SelectionPath::Random);
            assert!(!["Alice", "Bob"].contains(&selection.winner.name.as_str()));
        }
    }

    #[test]
    fn eligible_forced_head_wins() {
        let source = pool();
        let pool = eligible(&source, &[], DrawMode::All, "pune");
        let mut queue = ForcedWinnerQueue::new(["Dan".to_string(), "Bob".to_string()]);
        let selection =
            select_winner(&source, &pool, &mut queue, &mut ScriptedRandom::default()).unwrap();

        assert_eq!(selection.winner.name, "Dan");
        assert_eq!(selection.path, SelectionPath::Forced);
        assert_eq!(queue.names(), vec!["Bob"]);
    }

    #[test]
    fn ineligible_forced_head_is_discarded_and_pick_is_random() {
        let source = vec![Entrant::new("Bob", "Pune"), Entrant::new("Eve", "Pune")];
        let pool = eligible(&source, &[], DrawMode::All, "pune");
        let mut queue = ForcedWinnerQueue::new(["Alice".to_string(), "Bob".to_string()]);
        let selection =
            select_winner(&source, &pool, &mut queue, &mut ScriptedRandom::new([1])).unwrap();

        assert_eq!(selection.path, SelectionPath::Random);
        assert_eq!(selection.winner.name, "Eve");
        assert_eq!(queue.names(), vec!["Bob"]);
    }

    #[test]
    fn forced_name_filtered_out_by_region_is_consumed() {
        let source = pool();
        let pool = eligible(&source, &[], DrawMode::RegionB, "pune");
        let mut queue = ForcedWinnerQueue::new(["Alice".to_string()]);
        let selection =
            select_winner(&source, &pool, &mut queue, &mut ScriptedRandom::new([0])).unwrap();

        assert_eq!(selection.winner.name, "Bob");
        assert!(queue.is_empty());
    }

    #[test]
    fn exhausted_pool_falls_back_to_whole_source() {
        let source = vec![Entrant::new("A", "Pune"), Entrant::new("B", "Pune")];
        let history = won(&["A", "B"]);
        let pool = eligible(&source, &history, DrawMode::All, "pune");
        assert!(pool.is_empty());

        let mut queue = ForcedWinnerQueue::new(["A".to_string()]);
        let mut rng = SeededRandom::new(1);
        let mut seen = HashSet::new();
        for _ in 0..64 {
            let selection = select_winner(&source, &pool, &mut queue, &mut rng).unwrap();
            assert_eq!(selection.path, SelectionPath::Fallback);
            seen.insert(selection.winner.name);
        }
        assert_eq!(seen.len(), 2);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn fallback_ignores_region_when_other_regions_still_have_candidates() {
        let source = pool();
        let history = won(&["Alice", "Carol"]);
        let pool = eligible(&source, &history, DrawMode::RegionA, "pune");
        assert!(pool.is_empty());

        let selection = select_winner(
            &source,
            &pool,
            &mut ForcedWinnerQueue::default(),
            &mut ScriptedRandom::new([3]),
        )
        .unwrap();
        assert_eq!(selection.path, SelectionPath::Fallback);
        assert_eq!(selection.winner.name, "Dan");
    }

    #[test]
    fn empty_source_selects_nothing() {
        let mut queue = ForcedWinnerQueue::new(["Alice".to_string()]);
        assert!(select_winner(&[], &[], &mut queue, &mut ScriptedRandom::default()).is_none());
        assert_eq!(queue.len(), 1);
    }
}
