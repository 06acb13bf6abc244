use crate::config::ClientConfig;
use crate::connection::WSConnection;
use crate::error::Error;
use crate::request::{
    client_headers, construct_http_request, host_field, parse_ws_url, HeaderSet, HOST,
    SEC_WEBSOCKET_ACCEPT, SEC_WEBSOCKET_KEY,
};
use crate::utils::{generate_websocket_accept_value, generate_websocket_key};
use log::debug;
use std::io;
use std::io::ErrorKind;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufStream,
};
use tokio::net::TcpStream;
use tokio::time::timeout;

pub(crate) const MAX_RESPONSE_SIZE: usize = 1024;
const SWITCHING_PROTOCOLS: &str = "HTTP/1.1 101";

/// Connects to `host:port` and performs the client handshake, using the default config.
pub async fn connect_async(host: &str, port: u16) -> Result<WSConnection<TcpStream>, Error> {
    connect_async_with_config(host, port, None).await
}

/// Connects to a `ws://` URL. The port falls back to 80 when the URL has none.
pub async fn connect_url(
    ws_url: &str,
    config: Option<ClientConfig>,
) -> Result<WSConnection<TcpStream>, Error> {
    let (host, port) = parse_ws_url(ws_url)?;
    connect_async_with_config(&host, port, config).await
}

pub async fn connect_async_with_config(
    host: &str,
    port: u16,
    config: Option<ClientConfig>,
) -> Result<WSConnection<TcpStream>, Error> {
    let config = config.unwrap_or_default();
    let address = format!("{}:{}", host, port);

    let connected = match timeout(config.connect_timeout, TcpStream::connect(&address)).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(ErrorKind::TimedOut, "connect timed out")),
    };

    match connected {
        Ok(stream) => perform_client_handshake(stream, &host_field(host, port), Some(config)).await,
        Err(source) => {
            config.error_handler.handle(Error::ConnectionError {
                host: address,
                source,
            })?;
            // The handler chose to carry on, every following operation on this
            // connection fails with ConnectionClosed
            let headers = client_headers(
                &host_field(host, port),
                &generate_websocket_key(),
                &config.extra_headers,
            );
            Ok(WSConnection::new(None, headers, Vec::new(), &config))
        }
    }
}

/// Performs the upgrade handshake over an already established stream.
///
/// `host` is the value sent in the Host header. The stream is handed over to the returned
/// connection, which owns it from now on.
pub async fn perform_client_handshake<S: AsyncRead + AsyncWrite + Unpin>(
    stream: S,
    host: &str,
    config: Option<ClientConfig>,
) -> Result<WSConnection<S>, Error> {
    let config = config.unwrap_or_default();
    let key = generate_websocket_key();
    let headers = client_headers(host, &key, &config.extra_headers);

    // Buffering the stream keeps any bytes the server sent right after the handshake
    // response available for the frame decoder
    let mut stream = BufStream::new(stream);
    let response = negotiate(&mut stream, &headers, &config).await?;

    Ok(WSConnection::new(Some(stream), headers, response, &config))
}

/// Sends the upgrade request and validates the server response, returning it raw.
pub async fn negotiate<S: AsyncBufRead + AsyncWrite + Unpin>(
    stream: &mut S,
    headers: &HeaderSet,
    config: &ClientConfig,
) -> Result<Vec<u8>, Error> {
    let request = construct_http_request(headers);
    debug!("sending upgrade request:\n{}", request.trim_end());

    if let Err(source) = write_request(stream, request.as_bytes()).await {
        config.error_handler.handle(Error::UpgradeRequestError {
            host: headers.get(HOST).unwrap_or_default().to_string(),
            source,
        })?;
    }

    let mut response = Vec::with_capacity(MAX_RESPONSE_SIZE);
    let read_result = match config.read_timeout {
        Some(duration) => match timeout(duration, read_response(stream, &mut response)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(ErrorKind::TimedOut, "Timed out reading from socket")),
        },
        None => read_response(stream, &mut response).await,
    };
    if let Err(err) = read_result {
        // Whatever arrived so far still goes through validation below
        debug!("reading upgrade response stopped early: {}", err);
    }

    let response_str = String::from_utf8_lossy(&response).to_string();
    if !is_upgrade_accepted(&response_str) {
        config
            .error_handler
            .handle(Error::UpgradeResponseError(response_str))?;
        return Ok(response);
    }

    if config.verify_accept_key {
        let key = headers.get(SEC_WEBSOCKET_KEY).unwrap_or_default();
        if !accept_key_matches(&response, key) {
            config.error_handler.handle(Error::InvalidAcceptKey)?;
        }
    }

    debug!("server accepted websocket upgrade");
    Ok(response)
}

async fn write_request<W: AsyncWrite + Unpin>(stream: &mut W, request: &[u8]) -> io::Result<()> {
    stream.write_all(request).await?;
    stream.flush().await
}

// Reads line by line, so nothing past the blank line that ends the headers gets consumed,
// and never more than MAX_RESPONSE_SIZE bytes in total
async fn read_response<R: AsyncBufRead + Unpin>(
    stream: &mut R,
    response: &mut Vec<u8>,
) -> io::Result<()> {
    while response.len() < MAX_RESPONSE_SIZE && !response.ends_with(b"\r\n\r\n") {
        let remaining = (MAX_RESPONSE_SIZE - response.len()) as u64;
        let n = (&mut *stream)
            .take(remaining)
            .read_until(b'\n', response)
            .await?;
        if n == 0 {
            break;
        }
    }
    Ok(())
}

fn header_string_contains(header_string: &str, search: &str) -> bool {
    header_string
        .to_ascii_lowercase()
        .contains(&search.to_ascii_lowercase())
}

pub(crate) fn is_upgrade_accepted(response: &str) -> bool {
    !response.is_empty()
        && header_string_contains(response, SWITCHING_PROTOCOLS)
        && header_string_contains(response, SEC_WEBSOCKET_ACCEPT)
}

pub(crate) fn accept_key_matches(response: &[u8], key: &str) -> bool {
    let mut headers = [httparse::EMPTY_HEADER; 32];
    let mut parsed = httparse::Response::new(&mut headers);
    if parsed.parse(response).is_err() {
        return false;
    }

    parsed
        .headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(SEC_WEBSOCKET_ACCEPT))
        .map(|header| {
            String::from_utf8_lossy(header.value).trim() == generate_websocket_accept_value(key)
        })
        .unwrap_or(false)
}
