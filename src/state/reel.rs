//! Maps a chosen winner to the scroll target of the name reel.

use crate::state::{entrant::Entrant, random::RandomSource};

/// How many times the shuffled list is repeated on the reel.
pub const SPIN_CYCLES: usize = 10;
/// Visual extent of one reel row, in renderer units.
pub const ITEM_EXTENT: u64 = 100;

/// Scroll target for one draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelTarget {
    /// One shuffled cycle of names; the renderer repeats it [`SPIN_CYCLES`] times.
    pub spin_list: Vec<String>,
    /// Row of the landing name within one cycle.
    pub winner_index: usize,
    /// Distance to scroll, in renderer units.
    pub offset: u64,
}

/// Shuffle `spin_list` and locate `winner` on the last cycle of the reel.
///
/// A winner missing from the list (custom overlay disjoint from the primary pool) lands
/// on a random row. Returns `None` for an empty list.
pub fn position<R: RandomSource>(
    spin_list: &[Entrant],
    winner: &Entrant,
    rng: &mut R,
) -> Option<ReelTarget> {
    if spin_list.is_empty() {
        return None;
    }

    let mut shuffled: Vec<String> = spin_list.iter().map(|entry| entry.name.clone()).collect();
    rng.shuffle(&mut shuffled);

    let winner_index = shuffled
        .iter()
        .position(|name| *name == winner.name)
        .unwrap_or_else(|| rng.next_index(shuffled.len()));
    let offset = offset_for(shuffled.len(), winner_index);

    Some(ReelTarget {
        spin_list: shuffled,
        winner_index,
        offset,
    })
}

/// Offset of row `index` within the final cycle of a reel of `len` names per cycle.
pub fn offset_for(len: usize, index: usize) -> u64 {
    ((len * (SPIN_CYCLES - 1) + index) as u64) * ITEM_EXTENT
}
