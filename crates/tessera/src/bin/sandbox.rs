//! # Tessera Sandbox
//!
//! Headless play-test room. No window, no GPU: draw calls go to a
//! recording device and the interesting state is logged.
//!
//! The room holds a player and an enemy that chases it. The enemy fires a
//! bolt at the player every second, bolts burst into sparks on the walls,
//! and the camera pans back and forth across the room.
//!
//! ```bash
//! # Default config, 600 frames
//! cargo run --bin sandbox
//!
//! # Custom config and frame count, JSON logs
//! LOG_FORMAT=json cargo run --bin sandbox -- path/to/game.toml 1200
//! ```

use std::path::PathBuf;

use tessera::core::{EntityHandle, Interpolant, RecordingDevice, TweenMode};
use tessera::shared::{Vec2, Vec3};
use tessera::{GameConfig, GameContext, GameLoop, GameLoopConfig, GameResult, Kind};

/// Fixed simulation step of the headless run.
const FRAME_DT: f32 = 1.0 / 60.0;

/// Frames between two status lines.
const REPORT_EVERY: u64 = 60;

/// Frames between two enemy shots.
const FIRE_EVERY: u64 = 60;

/// Bolt speed (units per second).
const BOLT_SPEED: f32 = 8.0;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

fn main() {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map_or_else(
        || PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/config/game.toml")),
        PathBuf::from,
    );
    let frames = args
        .next()
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(600);

    if let Err(err) = run(&config_path, frames) {
        tracing::error!("Sandbox failed: {}", err);
        std::process::exit(1);
    }
}

fn run(config_path: &std::path::Path, frames: u64) -> GameResult<()> {
    let config = GameConfig::load(config_path)?;
    let mut context = GameContext::from_config(&config)?;

    let (player, enemy) = populate(&mut context)?;

    let room_width = context.grid().width() as f32;
    let mut pan = Interpolant::new(
        Vec2::new(config.camera.fov_x, config.camera.start_y),
        Vec2::new(room_width - config.camera.fov_x, config.camera.start_y),
        4.0,
        TweenMode::PingPong,
    );

    let mut device = RecordingDevice::new();
    let mut game_loop = GameLoop::new(GameLoopConfig {
        enable_timing_logs: config.debug.frame_timing_logs,
        ..GameLoopConfig::default()
    });

    for frame in 0..frames {
        if frame % FIRE_EVERY == FIRE_EVERY - 1 {
            fire(&mut context, enemy, player);
        }

        pan.update(FRAME_DT);
        context.set_camera_position(pan.value());

        device.clear();
        let stats = game_loop.run_frame(&mut context, &mut device, FRAME_DT);
        spark_landings(&mut context, player);

        if frame % REPORT_EVERY == 0 {
            report(&context, player, enemy, frame, stats.draw_calls);
        }
    }

    game_loop.stats().log_summary();
    Ok(())
}

/// Spawns the player and the chasing enemy, mirroring the classic test room.
fn populate(context: &mut GameContext) -> GameResult<(EntityHandle, EntityHandle)> {
    let player = context.spawn(Kind::Player, "quad", "hero")?;
    if let Some(hero) = context.get_mut(player) {
        hero.set_position(Vec3::new(3.5, 1.5, 0.0));
    }
    context.set_animation(player, "walk", 0.1, true);

    let enemy = context.spawn(Kind::Enemy, "quad", "grunt")?;
    if let Some(grunt) = context.get_mut(enemy) {
        grunt.set_position(Vec3::new(10.5, 1.5, 0.0));
        grunt.set_target(Some(player));
    }
    context.set_animation(enemy, "walk", 0.1, true);

    tracing::info!("Spawned player {} and enemy {}", player, enemy);
    Ok((player, enemy))
}

/// Launches a bolt from the enemy toward the player.
fn fire(context: &mut GameContext, from: EntityHandle, at: EntityHandle) {
    let (Some(origin), Some(target)) = (context.position_of(from), context.position_of(at)) else {
        return;
    };
    let direction = if target.x < origin.x { -1.0 } else { 1.0 };

    // Exhaustion is already logged by the pool.
    let Ok(bolt) = context.spawn(Kind::Projectile, "quad", "bolt") else {
        return;
    };
    if let Some(entity) = context.get_mut(bolt) {
        entity.set_position(origin + Vec3::new(direction * 0.6, 0.0, 0.0));
        entity.set_velocity(Vec3::new(direction * BOLT_SPEED, 0.0, 0.0));
        entity.set_scale(Vec3::splat(0.5));
        entity.set_lifetime(3.0);
    }
    context.set_animation(bolt, "spin", 0.05, true);
}

/// Puffs a short-lived spark under the player when it lands.
fn spark_landings(context: &mut GameContext, player: EntityHandle) {
    let Some(position) = context
        .get(player)
        .filter(|hero| hero.has_landed())
        .map(|hero| hero.position())
    else {
        return;
    };

    let Ok(spark) = context.spawn(Kind::Effect, "quad", "spark") else {
        return;
    };
    if let Some(entity) = context.get_mut(spark) {
        entity.set_position(position - Vec3::new(0.0, 0.4, 0.0));
        entity.set_lifetime(0.5);
    }
    context.set_animation(spark, "burst", 0.1, false);
}

fn report(
    context: &GameContext,
    player: EntityHandle,
    enemy: EntityHandle,
    frame: u64,
    draw_calls: usize,
) {
    let fmt = |handle| {
        context
            .position_of(handle)
            .map_or_else(|| "gone".to_owned(), |p: Vec3| format!("{:.2},{:.2}", p.x, p.y))
    };

    tracing::info!(
        "frame {} | player {} | enemy {} | touching {} | live {} | draws {}",
        frame,
        fmt(player),
        fmt(enemy),
        context.overlapping(player, enemy),
        context.live_count(),
        draw_calls
    );
}
