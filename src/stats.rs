//! Per-frame update statistics for debugging and performance analysis.
//!
//! The tree keeps one [`FrameStats`] for the last completed frame and one
//! running total. Both are cheap counters and always on.

/// Counters for one or more update passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    /// Nodes visited by the update traversal.
    pub nodes_updated: u64,
    /// Nodes whose draw info was recomputed because they were invalidated.
    pub draw_info_computed: u64,
    /// Nodes that were clean and reused their previous draw info.
    pub draw_info_skipped: u64,
    /// Interpolated or final transform values written.
    pub transforms_applied: u64,
    /// Non-looping transforms that reached their end and were removed.
    pub transforms_completed: u64,
    pub tasks_run: u64,
}

impl FrameStats {
    /// Share of visited nodes that skipped the geometry recompute, in percent.
    pub fn skip_rate(&self) -> f64 {
        let total = self.draw_info_computed + self.draw_info_skipped;
        if total == 0 {
            0.0
        } else {
            self.draw_info_skipped as f64 / total as f64 * 100.0
        }
    }

    pub(crate) fn accumulate(&mut self, frame: &FrameStats) {
        self.frames += frame.frames;
        self.nodes_updated += frame.nodes_updated;
        self.draw_info_computed += frame.draw_info_computed;
        self.draw_info_skipped += frame.draw_info_skipped;
        self.transforms_applied += frame.transforms_applied;
        self.transforms_completed += frame.transforms_completed;
        self.tasks_run += frame.tasks_run;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_rate() {
        let stats = FrameStats {
            draw_info_computed: 1,
            draw_info_skipped: 3,
            ..Default::default()
        };
        assert_eq!(stats.skip_rate(), 75.0);
        assert_eq!(FrameStats::default().skip_rate(), 0.0);
    }

    #[test]
    fn test_accumulate() {
        let frame = FrameStats {
            frames: 1,
            nodes_updated: 4,
            tasks_run: 2,
            ..Default::default()
        };
        let mut total = FrameStats::default();
        total.accumulate(&frame);
        total.accumulate(&frame);
        assert_eq!(total.frames, 2);
        assert_eq!(total.nodes_updated, 8);
        assert_eq!(total.tasks_run, 4);
    }
}
