//! Keyboard shortcuts forwarded by the renderer.

use crate::state::draw::DrawMode;

/// Action bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Draw with a fixed mode.
    Draw(DrawMode),
    /// Draw again with the last used mode.
    Repeat,
}

impl Shortcut {
    /// Map a key name to its shortcut. Unknown keys map to `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "1" => Some(Shortcut::Draw(DrawMode::RegionA)),
            "2" => Some(Shortcut::Draw(DrawMode::RegionB)),
            "3" => Some(Shortcut::Draw(DrawMode::All)),
            " " => Some(Shortcut::Repeat),
            _ if key.eq_ignore_ascii_case("space") => Some(Shortcut::Repeat),
            _ => None,
        }
    }

    /// Mode the draw uses, given the mode of the previous draw.
    pub fn mode(&self, last: DrawMode) -> DrawMode {
        match self {
            Shortcut::Draw(mode) => *mode,
            Shortcut::Repeat => last,
        }
    }
}
