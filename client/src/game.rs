use crate::dispatcher::{dispatch, DispatchContext, DispatchOutcome, LatencyReading};
use crate::indicator;
use crate::network::{Transport, TransportEvent};
use crate::player::LocalPlayer;
use crate::rendering::{Colour, Surface};
use crate::roster::Roster;
use crate::scheduler::FrameScheduler;
use crate::stars::Star;
use crate::viewport::Viewport;
use log::{debug, info};
use rand::Rng;
use shared::{
    encode_frame, Frame, FRAME_INTERVAL_MS, SPAWN_X, SPAWN_Y, STAR_COUNT, WORLD_HEIGHT,
    WORLD_WIDTH,
};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Settings a game cannot run with
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("screen size must be positive, got {0}x{1}")]
    ScreenSize(f32, f32),
    #[error("world size must be positive and finite, got {0}x{1}")]
    WorldSize(f32, f32),
}

/// Screen, world and timing settings for one game
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: f32,
    pub height: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub frame_interval: Duration,
    pub spawn: (f32, f32),
    pub star_count: usize,
}

impl GameConfig {
    /// Rejects sizes the viewport and star field cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extent = |v: f32| v.is_finite() && v > 0.0;

        if !extent(self.width) || !extent(self.height) {
            return Err(ConfigError::ScreenSize(self.width, self.height));
        }
        if !extent(self.world_width) || !extent(self.world_height) {
            return Err(ConfigError::WorldSize(self.world_width, self.world_height));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            frame_interval: Duration::from_millis(FRAME_INTERVAL_MS),
            spawn: (SPAWN_X, SPAWN_Y),
            star_count: STAR_COUNT,
        }
    }
}

/// Owns the local player, the roster and the view, and ties transport
/// events and scheduled steps to them.
///
/// Losing the connection does not stop the step loop: the game keeps
/// simulating and drawing against the last known roster until the transport
/// reopens, at which point the existing local player is kept.
pub struct GameController {
    config: GameConfig,
    player: Option<LocalPlayer>,
    roster: Roster,
    viewport: Viewport,
    stars: Vec<Star>,
    scheduler: FrameScheduler,
    online: bool,
    latency: Option<LatencyReading>,
}

impl GameController {
    /// Controller with no local player yet. The player spawns on connect.
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    /// Like [`GameController::new`] with a caller-supplied rng for the stars
    pub fn with_rng<R: Rng>(config: GameConfig, rng: &mut R) -> Self {
        let viewport = Viewport::new(
            config.width,
            config.height,
            config.world_width,
            config.world_height,
        );
        let stars = Star::scatter(config.star_count, config.width, config.height, rng);
        let scheduler = FrameScheduler::new(config.frame_interval);

        Self {
            config,
            player: None,
            roster: Roster::new(),
            viewport,
            stars,
            scheduler,
            online: false,
            latency: None,
        }
    }

    /// Routes one transport event to the matching handler
    pub fn handle_event(&mut self, event: TransportEvent, transport: &mut dyn Transport) {
        match event {
            TransportEvent::Open => self.on_connect(transport),
            TransportEvent::Message(text) => {
                self.on_message(&text, transport);
            }
            TransportEvent::Close => self.on_disconnect(),
        }
    }

    /// Marks the game online and, on the first connection only, spawns the
    /// local player and announces it. Starts the step loop.
    pub fn on_connect(&mut self, transport: &mut dyn Transport) {
        info!("Connected to server");
        self.online = true;

        if self.player.is_some() {
            return;
        }

        let (x, y) = self.config.spawn;
        let player = LocalPlayer::new(x, y);
        transport.send(encode_frame(&Frame::NewPlayer {
            id: None,
            x: player.x,
            y: player.y,
            angle: player.angle,
            colour: None,
        }));

        info!("Spawned local player at ({}, {})", x, y);
        self.viewport.center_on(x, y);
        self.player = Some(player);
        self.scheduler.start(Instant::now());
    }

    /// Dispatches one inbound text frame against the current state
    pub fn on_message(&mut self, text: &str, transport: &mut dyn Transport) -> DispatchOutcome {
        let mut ctx = DispatchContext {
            player: self.player.as_mut(),
            roster: &mut self.roster,
            viewport: &self.viewport,
            transport,
            latency: &mut self.latency,
        };
        dispatch(text, &mut ctx)
    }

    /// Marks the game offline. Steps keep running.
    pub fn on_disconnect(&mut self) {
        info!("Disconnected from server, continuing with stale roster");
        self.online = false;
    }

    /// Runs one step if the scheduler says it is due. Returns whether a
    /// step ran.
    pub fn tick<S: Surface + ?Sized>(
        &mut self,
        now: Instant,
        transport: &mut dyn Transport,
        surface: &mut S,
    ) -> bool {
        if !self.scheduler.is_due(now) {
            return false;
        }

        self.update();
        self.draw(surface);
        self.broadcast_if_dirty(transport);

        self.scheduler.rearm(Instant::now());
        true
    }

    /// Halts the step loop, no further step is scheduled
    pub fn stop_animation(&mut self) {
        self.scheduler.stop();
    }

    /// Resolves when the next step is due, never while stopped
    pub async fn wait_due(&self) {
        self.scheduler.wait_due().await
    }

    /// Simulation half of a step: moves the local player, refreshes remote
    /// screen positions and scrolls the stars with the camera
    pub fn update(&mut self) {
        let Some(player) = self.player.as_mut() else {
            return;
        };

        player.update();

        if !self.viewport.is_within_world_bounds(player.x, player.y) {
            (player.x, player.y) = self.viewport.clamp_to_world(player.x, player.y);
        }

        for remote in self.roster.iter_mut() {
            if self.viewport.is_within_viewport(remote.x, remote.y) {
                (remote.screen_x, remote.screen_y) =
                    self.viewport.project_to_screen(remote.x, remote.y);
            }
        }

        let delta_x = player.x - self.viewport.x;
        let delta_y = player.y - self.viewport.y;
        for star in &mut self.stars {
            star.update(delta_x, delta_y);
            star.wrap(self.config.width, self.config.height);
        }

        self.viewport.center_on(player.x, player.y);
    }

    /// Render half of a step
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        self.viewport.draw(surface);

        for star in &self.stars {
            star.draw(surface);
        }

        if let Some(player) = &self.player {
            let local_screen = self.viewport.project_to_screen(player.x, player.y);
            player.draw(surface, local_screen.0, local_screen.1);

            for remote in self.roster.iter() {
                if self.viewport.is_within_viewport(remote.x, remote.y) {
                    remote.draw(surface);
                    continue;
                }

                let remote_screen = self.viewport.project_to_screen(remote.x, remote.y);
                let markers = indicator::project(
                    local_screen,
                    remote_screen,
                    self.viewport.width,
                    self.viewport.height,
                );
                indicator::draw_markers(surface, &markers);
            }
        }

        self.draw_hud(surface);
    }

    fn draw_hud<S: Surface + ?Sized>(&self, surface: &mut S) {
        if let Some(latency) = &self.latency {
            surface.draw_text(&latency.label(), 10.0, 20.0, Colour::WHITE);
        }

        if !self.online {
            surface.draw_text(
                "OFFLINE",
                self.viewport.width / 2.0 - 30.0,
                self.viewport.height / 2.0,
                Colour::MARKER,
            );
        }
    }

    fn broadcast_if_dirty(&mut self, transport: &mut dyn Transport) {
        let Some(player) = self.player.as_mut() else {
            return;
        };

        if player.take_dirty() {
            debug!("Sending position ({:.1}, {:.1})", player.x, player.y);
            transport.send(encode_frame(&Frame::UpdatePlayer {
                id: None,
                x: player.x,
                y: player.y,
                angle: player.angle,
            }));
        }
    }

    /// Local player, once the first connection has spawned it
    pub fn player(&self) -> Option<&LocalPlayer> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut LocalPlayer> {
        self.player.as_mut()
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn latency(&self) -> Option<&LatencyReading> {
        self.latency.as_ref()
    }

    /// Whether the transport is currently open
    pub fn is_online(&self) -> bool {
        self.online
    }
}
