use crate::error::Error;
use std::fmt;
use url::Url;

pub(crate) const REQUEST_LINE: &str = "GET / HTTP/1.1\r\n";
pub(crate) const HOST: &str = "Host";
pub(crate) const SEC_WEBSOCKET_KEY: &str = "Sec-WebSocket-Key";
pub(crate) const SEC_WEBSOCKET_ACCEPT: &str = "Sec-WebSocket-Accept";

/// Ordered collection of HTTP headers used for the upgrade request.
///
/// Header names are matched case-insensitively. Setting a name that is already present
/// replaces its value in place, so the last write wins and the original position is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(header) => *header = (name.to_string(), value.to_string()),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn merge(&mut self, other: &HeaderSet) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

// Renders every header as a `Key: Value\r\n` line
impl fmt::Display for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        Ok(())
    }
}

// The headers every upgrade request carries, caller supplied headers are merged on top,
// so they may override any of these
pub(crate) fn client_headers(host: &str, key: &str, extra_headers: &HeaderSet) -> HeaderSet {
    let mut headers = HeaderSet::new();
    headers.set(HOST, host);
    headers.set("Pragma", "no-cache");
    headers.set("Upgrade", "WebSocket");
    headers.set("Connection", "Upgrade");
    headers.set(SEC_WEBSOCKET_KEY, key);
    headers.set("Sec-WebSocket-Version", "13");
    headers.merge(extra_headers);
    headers
}

// Since everything is bytes into the TCP packets anyway, the request is built as a plain
// string and converted to bytes when sending it to the server
pub(crate) fn construct_http_request(headers: &HeaderSet) -> String {
    format!("{}{}\r\n", REQUEST_LINE, headers)
}

// The Host header only carries the port when it isn't the default HTTP one
pub(crate) fn host_field(host: &str, port: u16) -> String {
    match port {
        80 => String::from(host),
        port => format!("{}:{}", host, port),
    }
}

// Parses a ws:// URL into the host and port used for the TCP connection. wss is refused,
// since this client doesn't speak TLS.
pub(crate) fn parse_ws_url(ws_url: &str) -> Result<(String, u16), Error> {
    let parsed_url = Url::parse(ws_url)?;

    if parsed_url.scheme() != "ws" {
        return Err(Error::InvalidSchemeURL);
    }

    let host = parsed_url.host_str().ok_or(Error::URLNoHost)?;
    let port = parsed_url.port().unwrap_or(80);

    Ok((String::from(host), port))
}
