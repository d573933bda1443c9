//! Status report snapshot and its renderings
//!
//! `Display` gives the one-line `scene=..,cnt=..` status form; the two
//! 16-column panel lines come from [`StatusReport::panel_lines`].

use crate::core::types::{CountMode, Motion, SceneId, SensorSnapshot};
use std::fmt;

/// Width of one panel line
pub const PANEL_COLUMNS: usize = 16;

/// Navigation status at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub counter: u8,
    pub scene: SceneId,
    pub motion: Motion,
    pub count_mode: CountMode,
    pub halted: bool,
    pub snapshot: SensorSnapshot,
}

impl StatusReport {
    /// Two 16-column panel lines: `S<id> <MOTION>` and `C:<n> F<f>L<l>R<r>`
    pub fn panel_lines(&self) -> [String; 2] {
        let line1 = format!("S{} {:<12}", self.scene.id(), self.motion.label());
        let line2 = format!(
            "C:{} F{}L{}R{}",
            self.counter,
            u8::from(self.snapshot.front_blocked),
            u8::from(self.snapshot.left_blocked),
            u8::from(self.snapshot.right_blocked)
        );
        [fit_panel(&line1), fit_panel(&line2)]
    }
}

/// Pad or truncate to exactly one panel line
fn fit_panel(text: &str) -> String {
    let mut line: String = text.chars().take(PANEL_COLUMNS).collect();
    while line.chars().count() < PANEL_COLUMNS {
        line.push(' ');
    }
    line
}

/// Status line: `scene=<id>,cnt=<n>,opb=<mark>,f=<front>,l=<left>,r=<right>`
impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filtered = &self.snapshot.filtered;
        write!(
            f,
            "scene={},cnt={},opb={},f={},l={},r={}",
            self.scene.id(),
            self.counter,
            filtered.mark,
            filtered.front,
            filtered.left,
            filtered.right
        )
    }
}
