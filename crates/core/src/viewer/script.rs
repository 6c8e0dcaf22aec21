//! Textual event scripts for driving a viewer without a pointer device.
//!
//! Tokens are whitespace-separated:
//!
//! | token | event |
//! |---|---|
//! | `+` `=` `-` `0` | key press |
//! | `esc` | Escape key |
//! | `zoom-in` `zoom-out` `reset` | control-bar buttons |
//! | `wheel:<dy>` | wheel scroll |
//! | `down:<x>,<y>` | primary button press |
//! | `down-secondary:<x>,<y>` | secondary button press |
//! | `move:<x>,<y>` | pointer move |
//! | `up` | pointer release |
//! | `click:<backdrop\|image\|controls\|close>` | click |

use thiserror::Error;

use crate::viewer::{ClickTarget, Key, Point, PointerButton, ViewerEvent};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unknown viewer event '{0}'")]
    UnknownToken(String),
    #[error("Invalid number in '{0}'")]
    InvalidNumber(String),
    #[error("Expected '<x>,<y>' in '{0}'")]
    InvalidPoint(String),
}

fn parse_number(token: &str, raw: &str) -> Result<f64, ScriptError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ScriptError::InvalidNumber(token.to_string()))
}

fn parse_point(token: &str, raw: &str) -> Result<Point, ScriptError> {
    let (x, y) = raw.split_once(',').ok_or_else(|| ScriptError::InvalidPoint(token.to_string()))?;
    Ok(Point::new(parse_number(token, x)?, parse_number(token, y)?))
}

/// Parse a single token into an event.
pub fn parse_event(token: &str) -> Result<ViewerEvent, ScriptError> {
    let event = match token {
        "+" | "=" | "-" | "0" => {
            let c = token.chars().next().unwrap_or('0');
            ViewerEvent::Key(Key::Char(c))
        }
        "esc" | "escape" => ViewerEvent::Key(Key::Escape),
        "zoom-in" => ViewerEvent::Click(ClickTarget::ZoomInButton),
        "zoom-out" => ViewerEvent::Click(ClickTarget::ZoomOutButton),
        "reset" => ViewerEvent::Click(ClickTarget::ResetButton),
        "up" => ViewerEvent::PointerUp,
        _ => match token.split_once(':') {
            Some(("wheel", raw)) => ViewerEvent::Wheel { delta_y: parse_number(token, raw)? },
            Some(("down", raw)) => {
                ViewerEvent::PointerDown { button: PointerButton::Primary, at: parse_point(token, raw)? }
            }
            Some(("down-secondary", raw)) => ViewerEvent::PointerDown {
                button: PointerButton::Secondary,
                at: parse_point(token, raw)?,
            },
            Some(("move", raw)) => ViewerEvent::PointerMove { at: parse_point(token, raw)? },
            Some(("click", "backdrop")) => ViewerEvent::Click(ClickTarget::Backdrop),
            Some(("click", "image")) => ViewerEvent::Click(ClickTarget::Image),
            Some(("click", "controls")) => ViewerEvent::Click(ClickTarget::ControlBar),
            Some(("click", "close")) => ViewerEvent::Click(ClickTarget::CloseButton),
            _ => return Err(ScriptError::UnknownToken(token.to_string())),
        },
    };
    Ok(event)
}

/// Parse a whole script. Empty scripts yield no events.
pub fn parse_script(script: &str) -> Result<Vec<ViewerEvent>, ScriptError> {
    script.split_whitespace().map(parse_event).collect()
}
