//! Maze-and-water demo application
//!
//! Drives the scene core headlessly: builds the maze scene, walks the camera
//! through it, fires periodic center-screen picks, and rotates the frame
//! ring against a stand-in fence that retires work as soon as it is
//! "submitted". Real device, swapchain, and draw submission plug in behind
//! the same seams.

use std::cell::Cell;

use scene_engine::foundation::{logging, time::Timer};
use scene_engine::prelude::*;
use scene_engine::scene::item::RenderLayer;

/// Fence stand-in for a device that finishes each submission immediately
struct ImmediateFence {
    completed: Cell<u64>,
}

impl ImmediateFence {
    fn new() -> Self {
        Self {
            completed: Cell::new(0),
        }
    }

    /// Signal completion of a submission, as the GPU queue would
    fn signal(&self, value: u64) {
        self.completed.set(self.completed.get().max(value));
    }
}

impl GpuFence for ImmediateFence {
    fn completed_value(&self) -> u64 {
        self.completed.get()
    }

    fn wait_for(&self, value: u64) -> Result<(), RenderError> {
        // A real backend blocks here; the immediate queue has already
        // retired everything it signed.
        if self.completed.get() >= value {
            Ok(())
        } else {
            Err(RenderError::DeviceLost(value))
        }
    }
}

const CONFIG_PATH: &str = "maze_app.toml";
const FRAME_COUNT: u64 = 600;
const FIXED_DT: f32 = 1.0 / 60.0;

fn run() -> Result<(), SceneError> {
    let config = match SceneConfig::load_from_file(CONFIG_PATH) {
        Ok(config) => {
            log::info!("loaded config from {CONFIG_PATH}");
            config
        }
        Err(e) => {
            log::info!("no usable {CONFIG_PATH} ({e}); using defaults");
            SceneConfig::default()
        }
    };
    let move_speed = config.camera.move_speed;
    let (width, height) = (config.window.width as f32, config.window.height as f32);

    let mut scene = Scene::build(&config)?;
    let fence = ImmediateFence::new();
    let mut timer = Timer::new();

    for frame in 1..=FRAME_COUNT {
        // Synthetic input: probe the view center every quarter second the
        // way a right-click would, and keep walking while nothing blocks.
        if frame % 15 == 0 {
            let result = scene.pick(width * 0.5, height * 0.5);
            if let Some(hit) = result.hit {
                log::debug!(
                    "frame {frame}: center pick hit triangle {} at {:.2}",
                    hit.triangle,
                    hit.distance
                );
            }
        }
        scene.walk_camera(move_speed * FIXED_DT);

        let slot = scene.update_frame(FIXED_DT, &fence)?;

        // Draw submission would record command lists here from
        // `scene.layer_draws(..)` and the slot's buffers; the immediate
        // queue just signs the work off.
        fence.signal(frame);
        scene.record_submission(frame);

        timer.update();
        if frame % 120 == 0 {
            let opaque = scene.layer_draws(RenderLayer::Opaque).count();
            let highlight = scene.layer_draws(RenderLayer::Highlight).count();
            log::info!(
                "frame {frame}: slot {slot}, {opaque} opaque draws, highlight {}, \
                 blocked {}, {:.0} fps",
                if highlight > 0 { "on" } else { "off" },
                scene.movement_blocked(),
                timer.average_fps()
            );
        }
    }

    log::info!("done: {FRAME_COUNT} frames in {:.2}s", timer.total_time());
    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        // Device loss and construction failures are fatal by design.
        log::error!("fatal: {e}");
        std::process::exit(1);
    }
}
