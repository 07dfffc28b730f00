use std::time::Duration;

use crate::app::scheduler::{Scheduler, TimerId, TimerKind, Token};

/// Cadence of the reveal while visualizing.
pub const VISUALIZE_TICK: Duration = Duration::from_millis(30);

/// Replays the solver's exploration order one cell per tick.
///
/// The cursor only moves forward and never passes `total`. The player owns the
/// repeating tick timer it starts and cancels it when stopped, so a tick left
/// over from an earlier run is recognisable via [`VisualizationPlayer::owns`].
#[derive(Debug, Default)]
pub struct VisualizationPlayer {
    cursor: usize,
    total: usize,
    timer: Option<TimerId>,
}

impl VisualizationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cells revealed so far.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn owns(&self, id: TimerId) -> bool {
        self.timer == Some(id)
    }

    /// Reset the cursor for a new sequence of `total` cells and start ticking.
    pub fn start(&mut self, total: usize, scheduler: &mut Scheduler, generation: u64) {
        self.stop(scheduler);
        self.cursor = 0;
        self.total = total;
        self.timer = Some(scheduler.schedule_every(
            VISUALIZE_TICK,
            Token {
                generation,
                kind: TimerKind::VisualizeTick,
            },
        ));
        tracing::debug!("[player] started, {} cells to reveal", total);
    }

    /// Reveal one more cell. Returns `false` once every cell has been revealed.
    pub fn step(&mut self) -> bool {
        if self.cursor < self.total {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Release the tick timer, if any.
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        if let Some(id) = self.timer.take() {
            scheduler.cancel(id);
            tracing::debug!("[player] stopped at {}/{}", self.cursor, self.total);
        }
    }

    /// Stop and forget all progress.
    pub fn reset(&mut self, scheduler: &mut Scheduler) {
        self.stop(scheduler);
        self.cursor = 0;
        self.total = 0;
    }
}
