//! Engine.IO v4 / Socket.IO v5 text framing.
//!
//! Each WebSocket text message carries one Engine.IO packet. The first
//! character is the Engine.IO packet type; `4` (message) wraps a Socket.IO
//! packet whose own type follows immediately:
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}   open
//! 2 / 3                                                     ping / pong
//! 40 / 40{"sid":".."}                                       connect
//! 42["agent_response",{"response":".."}]                    event
//! ```

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Query string appended to the server URL when opening the WebSocket.
pub const HANDSHAKE_QUERY: &str = "socket.io/?EIO=4&transport=websocket";

/// Engine.IO open packet payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
}

/// A decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Engine.IO open handshake
    Open(OpenHandshake),
    /// Engine.IO close
    Close,
    /// Engine.IO ping from the server, answered with a pong
    Ping,
    /// Engine.IO pong
    Pong,
    /// Engine.IO noop
    Noop,
    /// Socket.IO namespace connect acknowledgement
    Connect(Option<Value>),
    /// Socket.IO namespace disconnect
    Disconnect,
    /// Socket.IO event with its first argument (or `null`)
    Event { name: String, data: Value },
    /// Socket.IO connect refusal
    ConnectError(Value),
}

/// Framing errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("empty frame")]
    Empty,

    #[error("unknown engine.io packet type '{0}'")]
    UnknownEnginePacket(char),

    #[error("unknown socket.io packet type '{0}'")]
    UnknownSocketPacket(char),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Build the WebSocket URL for an `http(s)://` server base URL.
pub fn socket_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if base.starts_with("ws://") || base.starts_with("wss://") {
        base.to_string()
    } else {
        format!("ws://{}", base)
    };
    format!("{}/{}", ws_base, HANDSHAKE_QUERY)
}

/// Socket.IO connect request for the default namespace.
pub fn encode_connect() -> String {
    "40".to_string()
}

/// Engine.IO pong.
pub fn encode_pong() -> String {
    "3".to_string()
}

/// Socket.IO event for the default namespace.
pub fn encode_event(name: &str, data: Option<&Value>) -> String {
    let args = match data {
        Some(data) => Value::Array(vec![Value::String(name.to_string()), data.clone()]),
        None => Value::Array(vec![Value::String(name.to_string())]),
    };
    format!("42{}", args)
}

/// Decode one WebSocket text message.
pub fn decode_frame(text: &str) -> Result<Frame, CodecError> {
    let mut chars = text.chars();
    let engine_type = chars.next().ok_or(CodecError::Empty)?;
    let rest = chars.as_str();

    match engine_type {
        '0' => serde_json::from_str(rest)
            .map(Frame::Open)
            .map_err(|e| CodecError::Malformed(e.to_string())),
        '1' => Ok(Frame::Close),
        '2' => Ok(Frame::Ping),
        '3' => Ok(Frame::Pong),
        '4' => decode_socket_packet(rest),
        '6' => Ok(Frame::Noop),
        other => Err(CodecError::UnknownEnginePacket(other)),
    }
}

fn decode_socket_packet(packet: &str) -> Result<Frame, CodecError> {
    let mut chars = packet.chars();
    let packet_type = chars.next().ok_or(CodecError::Empty)?;
    let payload = strip_namespace(chars.as_str());

    match packet_type {
        '0' => {
            if payload.is_empty() {
                Ok(Frame::Connect(None))
            } else {
                parse_json(payload).map(|v| Frame::Connect(Some(v)))
            }
        }
        '1' => Ok(Frame::Disconnect),
        '2' => decode_event(skip_ack_id(payload)),
        '4' => parse_json(payload).map(Frame::ConnectError),
        other => Err(CodecError::UnknownSocketPacket(other)),
    }
}

fn decode_event(payload: &str) -> Result<Frame, CodecError> {
    let value = parse_json(payload)?;
    let mut args = match value {
        Value::Array(args) => args.into_iter(),
        _ => return Err(CodecError::Malformed("event payload is not an array".to_string())),
    };
    let name = match args.next() {
        Some(Value::String(name)) => name,
        _ => return Err(CodecError::Malformed("event name missing".to_string())),
    };
    let data = args.next().unwrap_or(Value::Null);
    Ok(Frame::Event { name, data })
}

/// Namespaced packets look like `/admin,["event"]`.
fn strip_namespace(payload: &str) -> &str {
    if payload.starts_with('/') {
        match payload.find(',') {
            Some(idx) => &payload[idx + 1..],
            None => "",
        }
    } else {
        payload
    }
}

fn skip_ack_id(payload: &str) -> &str {
    payload.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn parse_json(payload: &str) -> Result<Value, CodecError> {
    serde_json::from_str(payload).map_err(|e| CodecError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let frame = decode_frame(
            r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#,
        )
        .unwrap();
        match frame {
            Frame::Open(open) => {
                assert_eq!(open.sid, "abc");
                assert_eq!(open.ping_interval, 25000);
                assert_eq!(open.ping_timeout, 20000);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_control_frames() {
        assert_eq!(decode_frame("1").unwrap(), Frame::Close);
        assert_eq!(decode_frame("2").unwrap(), Frame::Ping);
        assert_eq!(decode_frame("3").unwrap(), Frame::Pong);
        assert_eq!(decode_frame("6").unwrap(), Frame::Noop);
        assert_eq!(decode_frame("41").unwrap(), Frame::Disconnect);
    }

    #[test]
    fn test_decode_connect_ack() {
        assert_eq!(decode_frame("40").unwrap(), Frame::Connect(None));
        assert_eq!(
            decode_frame(r#"40{"sid":"xyz"}"#).unwrap(),
            Frame::Connect(Some(json!({"sid": "xyz"})))
        );
    }

    #[test]
    fn test_decode_event_with_data() {
        let frame = decode_frame(r#"42["agent_typing",{"typing":true}]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Event {
                name: "agent_typing".to_string(),
                data: json!({"typing": true}),
            }
        );
    }

    #[test]
    fn test_decode_event_without_data_is_null() {
        let frame = decode_frame(r#"42["pong"]"#).unwrap();
        assert_eq!(
            frame,
            Frame::Event {
                name: "pong".to_string(),
                data: Value::Null,
            }
        );
    }

    #[test]
    fn test_decode_namespaced_event_with_ack_id() {
        let frame = decode_frame(r#"42/chat,17["joined",{"session_id":"s1"}]"#).unwrap();
        match frame {
            Frame::Event { name, data } => {
                assert_eq!(name, "joined");
                assert_eq!(data["session_id"], "s1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(decode_frame(""), Err(CodecError::Empty));
        assert_eq!(decode_frame("9"), Err(CodecError::UnknownEnginePacket('9')));
        assert_eq!(decode_frame("47"), Err(CodecError::UnknownSocketPacket('7')));
        assert!(matches!(decode_frame("42{}"), Err(CodecError::Malformed(_))));
        assert!(matches!(decode_frame("42[1]"), Err(CodecError::Malformed(_))));
        assert!(matches!(decode_frame("0nope"), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_encode_event() {
        let frame = encode_event("join_session", Some(&json!({"session_id": "s1"})));
        assert_eq!(frame, r#"42["join_session",{"session_id":"s1"}]"#);
        assert_eq!(encode_event("ping", None), r#"42["ping"]"#);
    }

    #[test]
    fn test_socket_url() {
        assert_eq!(
            socket_url("http://localhost:5000"),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_url("https://agents.example.com/"),
            "wss://agents.example.com/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_url("127.0.0.1:5000"),
            "ws://127.0.0.1:5000/socket.io/?EIO=4&transport=websocket"
        );
    }
}
