//! Inbound protocol frame handling
//!
//! Every frame is decoded and applied to the local player, the roster or the
//! transport. Nothing here is fatal: malformed frames are dropped, unknown
//! kinds are ignored and updates for players we do not know about are
//! no-ops, because the roster may legitimately lag behind the server.

use crate::network::Transport;
use crate::player::{LocalPlayer, RemotePlayer};
use crate::rendering::Colour;
use crate::roster::Roster;
use crate::viewport::Viewport;
use log::{debug, info};
use shared::{decode_frame, Frame, PlayerId, DEFAULT_COLOUR};

/// Latency the server last reported, shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyReading {
    pub id: Option<PlayerId>,
    pub ping_ms: f32,
}

impl LatencyReading {
    /// HUD text, e.g. `ID: 4 - 37ms`
    pub fn label(&self) -> String {
        match self.id {
            Some(id) => format!("ID: {} - {:.0}ms", id, self.ping_ms),
            None => format!("{:.0}ms", self.ping_ms),
        }
    }
}

/// What happened to one inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    /// Not JSON, not an object, or a known kind with bad fields
    Malformed,
    /// No kind tag or a kind this client does not know
    Ignored,
    LookupMiss(PlayerId),
    /// Well-formed frame with nothing to apply it to yet
    Unroutable,
}

/// State a frame may touch, borrowed from the game for one dispatch
pub struct DispatchContext<'a> {
    pub player: Option<&'a mut LocalPlayer>,
    pub roster: &'a mut Roster,
    pub viewport: &'a Viewport,
    pub transport: &'a mut dyn Transport,
    pub latency: &'a mut Option<LatencyReading>,
}

/// Decodes `raw` and applies it to `ctx`. Never fails; the outcome says
/// what happened to the frame.
pub fn dispatch(raw: &str, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
    let frame = match decode_frame(raw) {
        Ok(frame) => frame,
        Err(e) if e.is_forward_compatible() => {
            debug!("Ignoring frame: {}", e);
            return DispatchOutcome::Ignored;
        }
        Err(e) => {
            debug!("Dropping frame: {}", e);
            return DispatchOutcome::Malformed;
        }
    };

    match frame {
        Frame::SetColour { colour } => match ctx.player.as_deref_mut() {
            Some(player) => {
                player.colour = paint(&colour);
                DispatchOutcome::Applied
            }
            None => DispatchOutcome::Unroutable,
        },

        Frame::Ping { ts, ping, id } => {
            // Any non-null `ts` asks for an echo, whatever its type
            if ts.is_some() {
                ctx.transport.send(raw.to_string());
            }
            if let Some(ping_ms) = ping {
                *ctx.latency = Some(LatencyReading { id, ping_ms });
            }
            if let (Some(id), Some(player)) = (id, ctx.player.as_deref_mut()) {
                if player.id.is_none() {
                    info!("Server assigned player id {}", id);
                    player.id = Some(id);
                }
            }
            DispatchOutcome::Applied
        }

        Frame::NewPlayer {
            id: Some(id),
            x,
            y,
            angle,
            colour,
        } => {
            let colour = paint(colour.as_deref().unwrap_or(DEFAULT_COLOUR));
            let mut player = RemotePlayer::new(id, x, y, angle, colour);
            (player.screen_x, player.screen_y) = ctx.viewport.project_to_screen(x, y);

            debug!("Player {} joined at ({}, {})", id, x, y);
            ctx.roster.insert(player);
            DispatchOutcome::Applied
        }

        Frame::UpdatePlayer {
            id: Some(id),
            x,
            y,
            angle,
        } => {
            let found = ctx.roster.update_by_id(id, |player| {
                player.x = x;
                player.y = y;
                player.angle = angle;
            });
            applied_or_miss(found, id)
        }

        Frame::UpdatePing { id, ping } => {
            let found = ctx
                .roster
                .update_by_id(id, |player| player.ping = Some(ping));
            applied_or_miss(found, id)
        }

        Frame::RemovePlayer { id } => {
            let found = ctx.roster.remove_by_id(id).is_some();
            if found {
                debug!("Player {} left", id);
            }
            applied_or_miss(found, id)
        }

        Frame::NewPlayer { id: None, .. } | Frame::UpdatePlayer { id: None, .. } => {
            debug!("Dropping player frame without an id");
            DispatchOutcome::Unroutable
        }
    }
}

/// Colours arrive as CSS text and are parsed once here, not per frame
fn paint(text: &str) -> Colour {
    Colour::parse(text).unwrap_or_else(|| {
        debug!("Unrecognised colour {:?}, using white", text);
        Colour::WHITE
    })
}

fn applied_or_miss(found: bool, id: PlayerId) -> DispatchOutcome {
    if found {
        DispatchOutcome::Applied
    } else {
        debug!("No player with id {}, dropping frame", id);
        DispatchOutcome::LookupMiss(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::RecordingSurface;
    use assert_approx_eq::assert_approx_eq;

    struct Fixture {
        player: Option<LocalPlayer>,
        roster: Roster,
        viewport: Viewport,
        sent: Vec<String>,
        latency: Option<LatencyReading>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut viewport = Viewport::new(800.0, 600.0, 2000.0, 2000.0);
            viewport.center_on(1000.0, 1000.0);
            Self {
                player: Some(LocalPlayer::new(1000.0, 1000.0)),
                roster: Roster::new(),
                viewport,
                sent: Vec::new(),
                latency: None,
            }
        }

        fn dispatch(&mut self, raw: &str) -> DispatchOutcome {
            let mut ctx = DispatchContext {
                player: self.player.as_mut(),
                roster: &mut self.roster,
                viewport: &self.viewport,
                transport: &mut self.sent,
                latency: &mut self.latency,
            };
            dispatch(raw, &mut ctx)
        }
    }

    #[test]
    fn test_new_player_projects_screen_position() {
        let mut fx = Fixture::new();
        let outcome = fx.dispatch(
            r#"{"type":"newPlayer","id":4,"x":1100,"y":900,"angle":1.5,"colour":"blue"}"#,
        );

        assert_eq!(outcome, DispatchOutcome::Applied);
        let remote = fx.roster.find_by_id(4).unwrap();
        assert_eq!((remote.screen_x, remote.screen_y), (500.0, 200.0));
        assert_eq!(remote.colour, Colour::rgb(0, 0, 255));
        assert_approx_eq!(remote.angle, 1.5, 1e-6);
    }

    #[test]
    fn test_new_player_without_colour_defaults_to_white() {
        let mut fx = Fixture::new();
        fx.dispatch(r#"{"type":"newPlayer","id":4,"x":0,"y":0,"angle":0}"#);
        assert_eq!(fx.roster.find_by_id(4).unwrap().colour, Colour::WHITE);
    }

    #[test]
    fn test_update_player_only_touches_target() {
        let mut fx = Fixture::new();
        fx.dispatch(r#"{"type":"newPlayer","id":1,"x":5,"y":5,"angle":0}"#);
        fx.dispatch(r#"{"type":"newPlayer","id":2,"x":6,"y":6,"angle":0}"#);

        let outcome = fx.dispatch(r#"{"type":"updatePlayer","id":2,"x":60,"y":70,"angle":2}"#);
        assert_eq!(outcome, DispatchOutcome::Applied);

        let updated = fx.roster.find_by_id(2).unwrap();
        assert_eq!((updated.x, updated.y, updated.angle), (60.0, 70.0, 2.0));
        let untouched = fx.roster.find_by_id(1).unwrap();
        assert_eq!((untouched.x, untouched.y, untouched.angle), (5.0, 5.0, 0.0));
    }

    #[test]
    fn test_lookup_misses_are_noops() {
        let mut fx = Fixture::new();
        fx.dispatch(r#"{"type":"newPlayer","id":1,"x":5,"y":5,"angle":0}"#);

        assert_eq!(
            fx.dispatch(r#"{"type":"updatePlayer","id":9,"x":1,"y":1,"angle":0}"#),
            DispatchOutcome::LookupMiss(9)
        );
        assert_eq!(
            fx.dispatch(r#"{"type":"updatePing","id":9,"ping":30}"#),
            DispatchOutcome::LookupMiss(9)
        );
        assert_eq!(
            fx.dispatch(r#"{"type":"removePlayer","id":9}"#),
            DispatchOutcome::LookupMiss(9)
        );
        assert_eq!(fx.roster.len(), 1);
        assert_eq!(fx.roster.find_by_id(1).unwrap().x, 5.0);
    }

    #[test]
    fn test_update_ping_stores_latency() {
        let mut fx = Fixture::new();
        fx.dispatch(r#"{"type":"newPlayer","id":3,"x":5,"y":5,"angle":0}"#);
        fx.dispatch(r#"{"type":"updatePing","id":3,"ping":48}"#);

        assert_eq!(fx.roster.find_by_id(3).unwrap().ping, Some(48.0));
    }

    #[test]
    fn test_set_colour_targets_local_player() {
        let mut fx = Fixture::new();
        let outcome = fx.dispatch(r#"{"type":"setColour","colour":"rgb(0, 255, 0)"}"#);

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert_eq!(fx.player.as_ref().unwrap().colour, Colour::rgb(0, 255, 0));
    }

    #[test]
    fn test_multibyte_colour_falls_back_to_white() {
        let mut fx = Fixture::new();
        fx.dispatch(r#"{"type":"setColour","colour":"rgb(0, 255, 0)"}"#);
        assert_eq!(
            fx.dispatch(r##"{"type":"setColour","colour":"#aé"}"##),
            DispatchOutcome::Applied
        );
        fx.dispatch(
            r##"{"type":"newPlayer","id":6,"x":0,"y":0,"angle":0,"colour":"#a€bc"}"##,
        );

        assert_eq!(fx.player.as_ref().unwrap().colour, Colour::WHITE);
        assert_eq!(fx.roster.find_by_id(6).unwrap().colour, Colour::WHITE);

        let mut surface = RecordingSurface::default();
        fx.player.as_ref().unwrap().draw(&mut surface, 10.0, 10.0);
        fx.roster.find_by_id(6).unwrap().draw(&mut surface);
        assert_eq!(surface.rockets().count(), 2);
    }

    #[test]
    fn test_set_colour_before_spawn_is_unroutable() {
        let mut fx = Fixture::new();
        fx.player = None;
        assert_eq!(
            fx.dispatch(r#"{"type":"setColour","colour":"red"}"#),
            DispatchOutcome::Unroutable
        );
    }

    #[test]
    fn test_ping_with_timestamp_is_echoed_verbatim() {
        let mut fx = Fixture::new();
        let raw = r#"{ "type": "ping", "ts": 1700000000123 }"#;
        fx.dispatch(raw);

        assert_eq!(fx.sent, vec![raw.to_string()]);
        assert!(fx.latency.is_none());
    }

    #[test]
    fn test_ping_timestamp_of_any_type_is_echoed() {
        let mut fx = Fixture::new();
        for raw in [
            r#"{"type":"ping","ts":"1700000000000"}"#,
            r#"{"type":"ping","ts":0}"#,
            r#"{"type":"ping","ts":{"sent":1}}"#,
        ] {
            assert_eq!(fx.dispatch(raw), DispatchOutcome::Applied, "{raw}");
        }
        assert_eq!(fx.sent.len(), 3);

        // Null counts as absent
        fx.dispatch(r#"{"type":"ping","ts":null,"ping":15}"#);
        assert_eq!(fx.sent.len(), 3);
        assert_eq!(fx.latency.map(|l| l.ping_ms), Some(15.0));
    }

    #[test]
    fn test_ping_with_latency_updates_display_and_identity() {
        let mut fx = Fixture::new();
        fx.dispatch(r#"{"type":"ping","ping":37,"id":12}"#);

        assert!(fx.sent.is_empty());
        let latency = fx.latency.unwrap();
        assert_eq!(latency.label(), "ID: 12 - 37ms");
        assert_eq!(fx.player.as_ref().unwrap().id, Some(12));

        // A later id does not reassign the local player
        fx.dispatch(r#"{"type":"ping","ping":40,"id":13}"#);
        assert_eq!(fx.player.as_ref().unwrap().id, Some(12));
    }

    #[test]
    fn test_ping_with_both_fields_echoes_and_displays() {
        let mut fx = Fixture::new();
        let raw = r#"{"type":"ping","ts":5,"ping":20,"id":1}"#;
        fx.dispatch(raw);

        assert_eq!(fx.sent.len(), 1);
        assert_eq!(fx.latency.map(|l| l.ping_ms), Some(20.0));
    }

    #[test]
    fn test_malformed_and_unknown_frames_change_nothing() {
        let mut fx = Fixture::new();
        fx.dispatch(r#"{"type":"newPlayer","id":1,"x":5,"y":5,"angle":0}"#);

        for raw in [
            "",
            "not json",
            r#"{"type":"newPlayer","id":2,"x":"#,
            r#"{"type":"updatePlayer","id":1,"x":"far"}"#,
            "[]",
        ] {
            assert_eq!(fx.dispatch(raw), DispatchOutcome::Malformed, "{raw}");
        }
        for raw in [r#"{"type":"chat","text":"hi"}"#, r#"{"id":1}"#] {
            assert_eq!(fx.dispatch(raw), DispatchOutcome::Ignored, "{raw}");
        }

        assert!(fx.sent.is_empty());
        assert_eq!(fx.roster.len(), 1);
        assert_eq!(fx.roster.find_by_id(1).unwrap().x, 5.0);
        assert_eq!(fx.player.as_ref().unwrap().colour, Colour::WHITE);
    }

    #[test]
    fn test_player_frames_without_id_are_unroutable() {
        let mut fx = Fixture::new();
        assert_eq!(
            fx.dispatch(r#"{"type":"newPlayer","x":5,"y":5,"angle":0}"#),
            DispatchOutcome::Unroutable
        );
        assert!(fx.roster.is_empty());
    }
}
