//! Ship Sandbox headless driver
//!
//! Runs a demo scene at the fixed simulation rate and hands each rendered
//! frame to a render thread as an immutable snapshot.
//!
//! Usage: `ship-sandbox [parameters.json] [seconds]`

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;
use ship_sandbox::GameController;
use ship_sandbox::consts::{MAX_STEPS_PER_FRAME, SIMULATION_STEP_TIME_DURATION};
use ship_sandbox::params::GameParameters;
use ship_sandbox::render::{RenderBuffers, RenderSnapshot};
use ship_sandbox::sim::{FishSpeciesDatabase, GadgetType, ShipDefinition, StructuralMaterial};

const FRAME_DURATION: Duration = Duration::from_micros(16_667);
const DEFAULT_RUN_SECONDS: f32 = 20.0;

fn load_params(path: Option<&str>) -> GameParameters {
    let Some(path) = path else {
        return GameParameters::default();
    };
    match GameParameters::load(path) {
        Ok(params) => {
            log::info!("Loaded parameters from {path}");
            params
        }
        Err(e) => {
            log::warn!("Could not load parameters from {path} ({e}), using defaults");
            GameParameters::default()
        }
    }
}

/// Stand-in renderer: consumes snapshots and reports what it would draw
fn spawn_render_thread(snapshots: mpsc::Receiver<RenderSnapshot>) -> thread::JoinHandle<u64> {
    thread::spawn(move || {
        let mut frames = 0u64;
        for snapshot in snapshots {
            frames += 1;
            if frames % 60 == 0 {
                log::debug!(
                    "Frame {frames}: {} points, {} springs, {} fishes, {} clouds, light {:.2}",
                    snapshot.total_points(),
                    snapshot.total_springs(),
                    snapshot.fishes.len(),
                    snapshot.clouds.len(),
                    snapshot.ambient_light_intensity
                );
            }
        }
        frames
    })
}

fn main() {
    env_logger::init();
    log::info!("Ship Sandbox (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let params = load_params(args.get(1).map(String::as_str));
    let run_seconds = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RUN_SECONDS);

    let mut controller = GameController::new(params, FishSpeciesDatabase::built_in(), 0x5eed);
    let hull = ShipDefinition::rectangle(Vec2::new(-20.0, -3.0), 40, 6, StructuralMaterial::wood());
    if let Err(e) = controller.add_ship(&hull) {
        log::error!("Demo ship rejected: {e}");
        return;
    }
    controller.toggle_gadget_at(GadgetType::RcBomb, Vec2::new(-10.0, 0.0));
    controller.toggle_gadget_at(GadgetType::TimerBomb, Vec2::new(10.0, 0.0));
    controller.start_day_light_cycle();

    let (sender, receiver) = mpsc::sync_channel::<RenderSnapshot>(1);
    let render_thread = spawn_render_thread(receiver);

    let mut render = RenderBuffers::new();
    let start = Instant::now();
    let mut last_frame = start;
    let mut accumulator = 0.0f32;
    let mut is_rc_detonated = false;
    let mut is_thanos_snapped = false;

    while start.elapsed().as_secs_f32() < run_seconds {
        let frame_start = Instant::now();
        let dt = (frame_start - last_frame).as_secs_f32().min(0.1);
        last_frame = frame_start;
        accumulator += dt;

        let mut steps = 0;
        while accumulator >= SIMULATION_STEP_TIME_DURATION && steps < MAX_STEPS_PER_FRAME {
            controller.run_game_iteration(&mut render);
            accumulator -= SIMULATION_STEP_TIME_DURATION;
            steps += 1;
        }

        // Scripted demo
        let t = controller.current_simulation_time();
        if !is_rc_detonated && t > 3.0 {
            controller.detonate_rc_bombs();
            controller.start_tsunami_notification(0.0, &mut render);
            is_rc_detonated = true;
        }
        if !is_thanos_snapped && t > 10.0 {
            controller.start_thanos_snap(0.0);
            is_thanos_snapped = true;
        }

        let immediate_fps = if dt > 0.0 { 1.0 / dt } else { 0.0 };
        controller.set_status_text(immediate_fps, immediate_fps);
        controller.upload(&mut render);
        if sender.send(render.take_snapshot()).is_err() {
            log::error!("Render thread hung up");
            break;
        }

        if let Some(remaining) = FRAME_DURATION.checked_sub(frame_start.elapsed()) {
            thread::sleep(remaining);
        }
    }

    drop(sender);
    match render_thread.join() {
        Ok(frames) => log::info!(
            "Rendered {frames} frames over {:.1}s of simulation (seed {:#x})",
            controller.current_simulation_time(),
            controller.seed()
        ),
        Err(_) => log::error!("Render thread panicked"),
    }
}
