//! The per-frame update traversal.
//!
//! For every loaded node reachable from the root, parent strictly before
//! children:
//!
//! 1. advance the node's framed clock from its parent's time
//! 2. run the scheduler tasks that are due
//! 3. apply transforms, force-writing the end value of finished ones
//! 4. run the behavior's `update` hook
//! 5. if invalidated, recompute draw info and clear the flags
//! 6. for containers: push this frame's flags down to every child, then
//!    recurse in draw order
//!
//! Clean nodes still run steps 1-4 and still recurse, since children own
//! their clocks, tasks and transforms independently of the parent's state.

use std::mem;

use log::trace;

use crate::animation::TransformState;
use crate::clock::Clock;
use crate::layout::{self, ParentSpace};
use crate::stats::FrameStats;
use crate::tree::{NodeId, Tree};

impl Tree {
    /// Advance the whole tree by one frame, reading the source clock once.
    pub fn update(&mut self) -> &FrameStats {
        let source_time = self.source.current_time();
        self.frame_stats = FrameStats {
            frames: 1,
            ..Default::default()
        };

        if let Some(root) = self.root {
            let space = ParentSpace::viewport(self.config.viewport);
            self.update_node(root, source_time, &space);
        }

        let frame = self.frame_stats;
        self.total_stats.accumulate(&frame);
        trace!(
            "frame: {} nodes, {} recomputed, {} transforms, {} tasks",
            frame.nodes_updated,
            frame.draw_info_computed,
            frame.transforms_applied,
            frame.tasks_run
        );
        &self.frame_stats
    }

    fn update_node(&mut self, id: NodeId, parent_time: f64, space: &ParentSpace) {
        let Some(node) = self.slot_mut(id) else {
            return;
        };
        let Some(clock) = node.clock.as_mut() else {
            return;
        };
        clock.process_frame(parent_time);
        let now = clock.current_time();
        node.scheduler.set_clock_time(now);
        self.frame_stats.nodes_updated += 1;

        self.run_scheduled(id);
        self.apply_transforms(id);
        self.with_behavior(id, |behavior, tree| behavior.update(tree, id));

        // Any of the above may have disposed or detached this node.
        if !self.contains(id) {
            return;
        }

        let Some(node) = self.slot_mut(id) else {
            return;
        };
        let flags = mem::take(&mut node.invalidation);
        if !flags.is_empty() {
            node.draw_info = layout::compute(&node.props, space);
        }
        let descend = node.children.is_some().then(|| {
            let time = node.clock.as_ref().map_or(now, |clock| clock.current_time());
            (ParentSpace::of(&node.draw_info, node.props.masking), time)
        });

        if flags.is_empty() {
            self.frame_stats.draw_info_skipped += 1;
        } else {
            self.frame_stats.draw_info_computed += 1;
        }
        let Some((child_space, time)) = descend else {
            return;
        };

        if !flags.is_empty() {
            for child in self.children(id).to_vec() {
                self.invalidate(child, flags, false);
            }
        }

        self.ensure_draw_order(id);
        for child in self.draw_order(id) {
            if self.parent(child) == Some(id) {
                self.update_node(child, time, &child_space);
            }
        }
    }

    fn run_scheduled(&mut self, id: NodeId) {
        let Some(node) = self.slot_mut(id) else {
            return;
        };
        let due = node.scheduler.take_due();

        for mut task in due {
            let live = self
                .slot(id)
                .is_some_and(|node| node.scheduler.is_live(task.id()));
            if !live {
                continue;
            }
            task.run(self);
            self.frame_stats.tasks_run += 1;
            if let Some(node) = self.slot_mut(id) {
                node.scheduler.finish(task);
            }
        }
    }

    /// Apply queued transforms in the order they were added, so that when two
    /// drive the same property the later one wins, and a transform queued
    /// behind another captures the value that one left behind.
    fn apply_transforms(&mut self, id: NodeId) {
        let Some(node) = self.slot_mut(id) else {
            return;
        };
        if node.transforms.is_empty() {
            return;
        }
        let Some(now) = node.clock.as_ref().map(|clock| clock.current_time()) else {
            return;
        };
        let mut transforms = mem::take(&mut node.transforms);

        let mut applied = 0;
        let mut completed = 0;
        transforms.retain_mut(|transform| {
            let Some(node) = self.slot(id) else {
                return false;
            };
            let (state, value) = transform.apply(&node.props, now);
            let finished = state == TransformState::Finished;
            if let (Some(value), Some(mut node)) = (value, self.node_mut(id)) {
                // The end value lands exactly; steps within epsilon are dropped.
                if finished {
                    node.set_end_value(value);
                } else {
                    node.set_value(value);
                }
                applied += 1;
            }
            if finished {
                completed += 1;
                return false;
            }
            true
        });

        self.frame_stats.transforms_applied += applied;
        self.frame_stats.transforms_completed += completed;

        if let Some(node) = self.slot_mut(id) {
            let added = mem::replace(&mut node.transforms, transforms);
            node.transforms.extend(added);
        }
    }
}
