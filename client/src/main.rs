use clap::Parser;
use client::game::{GameConfig, GameController};
use client::input::InputManager;
use client::network::WsTransport;
use client::rendering::{MacroquadSurface, RecordingSurface};
use log::info;
use macroquad::prelude::*;
use shared::{FRAME_INTERVAL_MS, SPAWN_X, SPAWN_Y, STAR_COUNT, WORLD_HEIGHT, WORLD_WIDTH};
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the game server
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8000")]
    server: String,

    /// Window width
    #[arg(short = 'w', long, default_value = "800", value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600", value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Milliseconds between simulation steps
    #[arg(short = 'i', long, default_value_t = FRAME_INTERVAL_MS)]
    interval_ms: u64,

    /// Delay before reconnecting after the connection drops, 0 disables
    #[arg(short = 'r', long, default_value = "2000")]
    reconnect_ms: u64,

    /// World width in pixels
    #[arg(long, default_value_t = WORLD_WIDTH, value_parser = parse_extent)]
    world_width: f32,

    /// World height in pixels
    #[arg(long, default_value_t = WORLD_HEIGHT, value_parser = parse_extent)]
    world_height: f32,

    /// Run without a window, e.g. as a bot client
    #[arg(long)]
    headless: bool,
}

/// Positive, finite size in pixels
fn parse_extent(arg: &str) -> Result<f32, String> {
    let value: f32 = arg.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("`{}` is not a positive size", arg))
    }
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            width: self.width as f32,
            height: self.height as f32,
            world_width: self.world_width,
            world_height: self.world_height,
            frame_interval: Duration::from_millis(self.interval_ms),
            spawn: (SPAWN_X, SPAWN_Y),
            star_count: STAR_COUNT,
        }
    }

    fn reconnect_delay(&self) -> Option<Duration> {
        (self.reconnect_ms > 0).then(|| Duration::from_millis(self.reconnect_ms))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Controls: Left/Right to rotate, Up to thrust, Escape to stop");

    let runtime = Runtime::new()?;
    let transport = WsTransport::spawn(
        runtime.handle(),
        args.server.clone(),
        args.reconnect_delay(),
    );
    let config = args.game_config();
    config.validate()?;

    if args.headless {
        runtime.block_on(run_headless(config, transport));
        return Ok(());
    }

    let window = Conf {
        window_title: "Rockets".to_string(),
        window_width: args.width as i32,
        window_height: args.height as i32,
        ..Default::default()
    };
    macroquad::Window::from_config(window, run_windowed(config, transport, runtime));

    Ok(())
}

/// Display loop. The runtime is moved in so the connection task lives as
/// long as the window.
async fn run_windowed(config: GameConfig, mut transport: WsTransport, _runtime: Runtime) {
    let mut surface = MacroquadSurface::new(config.width as usize, config.height as usize);
    let mut input = InputManager::new();
    let mut game = GameController::new(config);

    loop {
        while let Some(event) = transport.try_next_event() {
            game.handle_event(event, &mut transport);
        }

        if let Some(player) = game.player_mut() {
            input.update(player);
        }

        if is_key_pressed(KeyCode::Escape) {
            info!("Stopping animation");
            game.stop_animation();
        }

        game.tick(tokio::time::Instant::now(), &mut transport, &mut surface);
        surface.present();

        next_frame().await;
    }
}

async fn run_headless(config: GameConfig, mut transport: WsTransport) {
    let mut surface = RecordingSurface::default();
    let mut game = GameController::new(config);

    loop {
        tokio::select! {
            event = transport.next_event() => match event {
                Some(event) => game.handle_event(event, &mut transport),
                None => {
                    info!("Connection task ended");
                    break;
                }
            },

            _ = game.wait_due() => {
                game.tick(tokio::time::Instant::now(), &mut transport, &mut surface);
            },

            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            },
        }
    }

    info!("Ran {} steps", game.scheduler().steps());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_produce_valid_config() {
        let args = Args::try_parse_from(["client"]).unwrap();
        let config = args.game_config();

        assert_eq!((config.width, config.height), (800.0, 600.0));
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(args.reconnect_delay(), Some(Duration::from_millis(2000)));
    }

    #[test]
    fn test_zero_screen_size_is_rejected() {
        assert!(Args::try_parse_from(["client", "--width", "0"]).is_err());
        assert!(Args::try_parse_from(["client", "--height", "0"]).is_err());
    }

    #[test]
    fn test_bad_world_size_is_rejected() {
        for bad in ["NaN", "inf", "-100", "0", "wide"] {
            assert!(
                Args::try_parse_from(["client", "--world-width", bad]).is_err(),
                "{bad}"
            );
        }
        let args = Args::try_parse_from(["client", "--world-height", "500.5"]).unwrap();
        assert_eq!(args.world_height, 500.5);
    }

    #[test]
    fn test_zero_reconnect_disables_retry() {
        let args = Args::try_parse_from(["client", "-r", "0"]).unwrap();
        assert_eq!(args.reconnect_delay(), None);
    }
}
