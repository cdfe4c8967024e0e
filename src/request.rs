//! Line-oriented requests accepted by the click driver
//!
//! ```text
//! 7                      dispatch grid item 7
//! click 7                same
//! send 127.0.0.1:5001 x  send "x" directly to 127.0.0.1:5001
//! list                   list grid items by position
//! ```

use grid_dispatch_shared::{DispatchRequest, UdpCommand};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid grid item id: {0:?}")]
    InvalidId(String),

    #[error("expected <host>:<port>, got {0:?}")]
    InvalidDestination(String),

    #[error("unknown request: {0:?}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Click(DispatchRequest),
    Send(UdpCommand),
    List,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_line(line: &str) -> Result<Option<Request>, RequestError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    let request = match verb {
        "list" if rest.is_empty() => Request::List,
        "click" => Request::Click(parse_click(rest)?),
        "send" => Request::Send(parse_send(rest)?),
        _ if rest.is_empty() && verb.parse::<i64>().is_ok() => {
            Request::Click(parse_click(verb)?)
        }
        _ => return Err(RequestError::Unknown(line.to_string())),
    };

    Ok(Some(request))
}

fn parse_click(raw: &str) -> Result<DispatchRequest, RequestError> {
    raw.trim()
        .parse()
        .map(DispatchRequest::new)
        .map_err(|_| RequestError::InvalidId(raw.to_string()))
}

fn parse_send(raw: &str) -> Result<UdpCommand, RequestError> {
    // The command is everything after the destination, verbatim and possibly empty
    let (destination, command) = raw.split_once(' ').unwrap_or((raw, ""));

    let (host, port) = destination
        .rsplit_once(':')
        .and_then(|(host, port)| Some((host, port.parse::<u16>().ok()?)))
        .map(|(host, port)| (strip_brackets(host), port))
        .filter(|(host, _)| !host.is_empty())
        .ok_or_else(|| RequestError::InvalidDestination(destination.to_string()))?;

    Ok(UdpCommand::with_target(command, host, port))
}

/// `[::1]` -> `::1`; resolution takes IPv6 literals without brackets
fn strip_brackets(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}
