//! The command transport: an untyped request/response channel.
//!
//! Messages arrive as loose JSON from an external UI; the three kinds the
//! core answers form a closed tagged union over the `"type"` field. Anything
//! else parses to `None` and the transport treats it as not ours to answer.
//! Payload fields stay raw [`Value`]s here - coercion to typed control
//! values happens in [`policy`](crate::policy), right before they reach the
//! controller.

use serde::Serialize;
use serde_json::Value;

use crate::state::ControlState;

/// A command delivered into the page context.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    /// Liveness probe. No state change.
    Ping,
    /// Read the current control state. No side effects.
    GetState,
    /// Overwrite the control state. Fields are untrusted wire values.
    SetState { enabled: Value, percent: Value },
}

impl Request {
    /// Parse an untyped message, or `None` if it is not one of ours.
    pub fn parse(message: &Value) -> Option<Self> {
        match message.get("type")?.as_str()? {
            "PING" => Some(Request::Ping),
            "GET_STATE" => Some(Request::GetState),
            "SET_STATE" => Some(Request::SetState {
                enabled: message.get("enabled").cloned().unwrap_or(Value::Null),
                percent: message.get("percent").cloned().unwrap_or(Value::Null),
            }),
            _ => None,
        }
    }
}

/// A reply on its way back to the UI.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ack { ok: bool },
    State { enabled: bool, percent: f64 },
}

impl Response {
    /// The `{ "ok": true }` acknowledgement.
    pub fn ok() -> Self {
        Response::Ack { ok: true }
    }

    /// A `GET_STATE` reply carrying the state verbatim.
    pub fn state(state: ControlState) -> Self {
        Response::State {
            enabled: state.enabled,
            percent: state.percent,
        }
    }
}

/// A single-use deferred reply.
///
/// Handlers may respond immediately or stash the responder and respond
/// later; either way the reply callback runs at most once. Dropping a
/// responder without responding sends nothing, which is exactly what an
/// unhandled message should do.
pub struct Responder {
    reply: Option<Box<dyn FnOnce(Response)>>,
}

impl Responder {
    pub fn new(reply: impl FnOnce(Response) + 'static) -> Self {
        Self {
            reply: Some(Box::new(reply)),
        }
    }

    /// Deliver the response. Consumes the responder.
    pub fn respond(mut self, response: Response) {
        if let Some(reply) = self.reply.take() {
            reply(response);
        }
    }
}
