use log::{error, info};
use socket_flow_client::config::ClientConfig;
use socket_flow_client::handshake::connect_async_with_config;
use std::time::Duration;

// Connects to an echo server (127.0.0.1:9002 unless given as arguments), sends a few
// messages, one of them fragmented, and prints what comes back.
#[tokio::main]
async fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| String::from("127.0.0.1"));
    let port = args
        .next()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(9002);

    let config = ClientConfig {
        read_timeout: Some(Duration::from_secs(5)),
        ..ClientConfig::default()
    };

    match connect_async_with_config(&host, port, Some(config)).await {
        Ok(mut ws_connection) => {
            if let Err(err) = ws_connection.write_text("Hello from socket-flow-client").await {
                error!("Error when sending text: {}", err);
                return;
            }
            match ws_connection.read_text().await {
                Ok(text) => info!("Received: {}", text),
                Err(err) => error!("Error when reading: {}", err),
            }

            // Send one message split in two frames, the caller decides where it ends
            let fragments = [(&b"first half, "[..], false), (&b"second half"[..], true)];
            for (chunk, final_fragment) in fragments {
                if let Err(err) = ws_connection.write(chunk, final_fragment).await {
                    error!("Error when sending fragment: {}", err);
                    return;
                }
            }
            match ws_connection.read().await {
                Ok(data) => {
                    info!("Received {} bytes: {}", data.len(), String::from_utf8_lossy(&data))
                }
                Err(err) => error!("Error when reading: {}", err),
            }

            if let Err(err) = ws_connection.close().await {
                error!("Error when closing: {}", err);
            }
        }
        Err(err) => error!("Error when performing handshake: {}", err),
    }
}
