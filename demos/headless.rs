//! Runs a small scene without a window and prints what a renderer would be
//! asked to draw.
//!
//! ```sh
//! RUST_LOG=canopy=debug cargo run --example headless
//! ```

use canopy::prelude::*;

struct Pulse;

impl Behavior for Pulse {
    fn load(&mut self, tree: &mut Tree, id: NodeId, _dependencies: &Dependencies) {
        let scheduled = tree.node_mut(id).map(|mut node| {
            node.schedule_repeating(250.0, move |tree: &mut Tree| {
                if let Some(mut node) = tree.node_mut(id) {
                    node.scale_to(Vector2::splat(1.2), 100.0, Easing::OutQuad)
                        .delay(100.0)
                        .scale_to(Vector2::splat(1.0), 100.0, Easing::InQuad)
                        .delay_reset();
                }
            })
        });
        if let Some(Err(err)) = scheduled {
            log::error!("pulse not scheduled: {}", err);
        }
    }
}

fn main() -> canopy::Result<()> {
    env_logger::init();

    let clock = ManualClock::new();
    let mut tree = Tree::with_config(TreeConfig::new().viewport(640.0, 360.0), clock.clone());

    let root = tree.insert(
        container()
            .relative_size_axes(Axes::BOTH)
            .size((1.0, 1.0))
            .padding(MarginPadding::all(20.0))
            .label("screen"),
    );
    let panel = tree.insert(
        container()
            .anchor(Anchor::Centre)
            .origin(Anchor::Centre)
            .size((300.0, 200.0))
            .masking(true)
            .color(Color::from_hex(0x202830))
            .label("panel"),
    );
    let button = tree.insert(
        drawable()
            .anchor(Anchor::Centre)
            .origin(Anchor::Centre)
            .size((120.0, 40.0))
            .color(Color::from_hex(0x3a86ff))
            .depth(-1.0)
            .texture(TextureId(1))
            .behavior(Pulse)
            .label("button"),
    );

    tree.set_root(root)?;
    tree.add_child(root, panel)?;
    tree.add_child(panel, button)?;
    tree.node_mut(panel)
        .ok_or(canopy::error::TreeError::StaleNode(panel))?
        .fade_in(300.0, Easing::OutQuad);

    for frame in 0..30 {
        clock.advance(1000.0 / 60.0);
        let stats = *tree.update();
        if frame % 10 == 0 {
            println!(
                "frame {frame}: {} nodes, {} recomputed, {} transforms",
                stats.nodes_updated, stats.draw_info_computed, stats.transforms_applied
            );
            for command in tree.collect_draw() {
                println!(
                    "  {:?} rect={:?} alpha={:.2} clip={:?}",
                    command.node, command.rect, command.alpha, command.clip
                );
            }
        }
    }

    let press = Event::MouseDown {
        x: 320.0,
        y: 180.0,
        button: MouseButton::Left,
    };
    println!("press at centre: {:?}", tree.dispatch(&press));
    println!("totals: {:?}", tree.total_stats());
    Ok(())
}
