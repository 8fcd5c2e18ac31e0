use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const FRAME_INTERVAL_MS: u64 = 30;
pub const SPAWN_X: f32 = 1000.0;
pub const SPAWN_Y: f32 = 1000.0;
pub const WORLD_WIDTH: f32 = 2000.0;
pub const WORLD_HEIGHT: f32 = 2000.0;
pub const STAR_COUNT: usize = 20;

/// Radians turned per simulation step while a rotate control is held
pub const ROTATION_SPEED: f32 = 0.09;
/// Velocity gained per step along the facing direction while thrusting
pub const THRUST: f32 = 0.5;
pub const MAX_SPEED: f32 = 9.0;
/// Fraction of velocity kept per step when not thrusting
pub const DAMPING: f32 = 0.96;
pub const ROCKET_SIZE: f32 = 14.0;

pub const DEFAULT_COLOUR: &str = "rgb(255, 255, 255)";

pub type PlayerId = u32;

/// Every kind tag this client understands, in wire spelling
pub const FRAME_KINDS: [&str; 6] = [
    "newPlayer",
    "updatePlayer",
    "updatePing",
    "removePlayer",
    "setColour",
    "ping",
];

/// One protocol message, tagged by `type` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Frame {
    /// Inbound: a peer joined. Outbound: announces the local player, the id is
    /// assigned by the receiver.
    NewPlayer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<PlayerId>,
        x: f32,
        y: f32,
        angle: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        colour: Option<String>,
    },
    UpdatePlayer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<PlayerId>,
        x: f32,
        y: f32,
        angle: f32,
    },
    UpdatePing {
        id: PlayerId,
        ping: f32,
    },
    RemovePlayer {
        id: PlayerId,
    },
    SetColour {
        colour: String,
    },
    /// Latency probe. A non-null `ts` of any type asks for a verbatim echo,
    /// a present `ping` carries the latency the peer measured for `id`.
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ts: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ping: Option<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<PlayerId>,
    },
}

impl Frame {
    /// Wire spelling of this frame's `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::NewPlayer { .. } => "newPlayer",
            Frame::UpdatePlayer { .. } => "updatePlayer",
            Frame::UpdatePing { .. } => "updatePing",
            Frame::RemovePlayer { .. } => "removePlayer",
            Frame::SetColour { .. } => "setColour",
            Frame::Ping { .. } => "ping",
        }
    }
}

/// Why an inbound frame could not be decoded
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame has no kind tag")]
    MissingKind,
    #[error("unknown frame kind `{0}`")]
    UnknownKind(String),
}

impl ProtocolError {
    /// Unknown or missing kinds come from newer peers and are not corruption
    pub fn is_forward_compatible(&self) -> bool {
        matches!(self, ProtocolError::MissingKind | ProtocolError::UnknownKind(_))
    }
}

/// Decodes one inbound text frame.
///
/// The kind tag is checked before the payload so that frames from newer
/// peers are reported as `UnknownKind` rather than as malformed.
pub fn decode_frame(raw: &str) -> Result<Frame, ProtocolError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(ProtocolError::NotAnObject);
    }

    let kind = match value.get("type") {
        Some(Value::String(kind)) => kind.clone(),
        _ => return Err(ProtocolError::MissingKind),
    };
    if !FRAME_KINDS.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownKind(kind));
    }

    Ok(serde_json::from_value(value)?)
}

/// Encodes an outbound frame as JSON text
pub fn encode_frame(frame: &Frame) -> String {
    // A tagged enum of numbers, strings and options always serializes
    serde_json::to_string(frame).unwrap_or_default()
}
