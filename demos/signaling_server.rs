//! Simple signaling server example
//!
//! Run with: cargo run --example signaling_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example signaling_server                  # binds to 0.0.0.0:9030
//!   cargo run --example signaling_server localhost        # binds to 127.0.0.1:9030
//!   cargo run --example signaling_server 127.0.0.1:9031   # binds to 127.0.0.1:9031
//!
//! Connect a WebSocket client and send JSON events, e.g.:
//!
//!   {"type":"join","room_id":"demo","identity":"u1","display_name":"Alice"}
//!   {"type":"offer","target":"u2","payload":{"sdp":"v=0..."}}
//!   {"type":"send_message","room_id":"demo","identity":"u1",
//!    "display_name":"Alice","text":"hi","timestamp":0}
//!
//! The server relays offers/answers/candidates between members of the same
//! room and broadcasts join/leave/chat/toggle notices. A status line with
//! room and participant counts is logged every 30 seconds.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use signalhub::{ServerConfig, SignalingServer};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:9030
/// - "localhost:9031" -> 127.0.0.1:9031
/// - "127.0.0.1" -> 127.0.0.1:9030
/// - "0.0.0.0:9030" -> 0.0.0.0:9030
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 9030;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: signaling_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:9030)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  signaling_server                    # binds to 0.0.0.0:9030");
    eprintln!("  signaling_server localhost          # binds to 127.0.0.1:9030");
    eprintln!("  signaling_server 127.0.0.1:9031     # binds to 127.0.0.1:9031");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:9030".parse()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("signalhub=debug".parse()?)
                .add_directive("signaling_server=debug".parse()?),
        )
        .init();

    let config = ServerConfig::default().bind(bind_addr);

    println!("Starting signaling server on ws://{}", config.bind_addr);
    println!();
    println!("Join a room:");
    println!(
        "  {{\"type\":\"join\",\"room_id\":\"demo\",\"identity\":\"u1\",\"display_name\":\"Alice\"}}"
    );
    println!();

    let server = Arc::new(SignalingServer::new(config));

    // Periodic status line
    let registry = Arc::clone(server.registry());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(30));
        loop {
            ticker.tick().await;
            let status = registry.status().await;
            tracing::info!(
                uptime_secs = status.uptime_secs,
                rooms = status.room_count,
                participants = status.participant_count,
                "Server status"
            );
        }
    });

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    Ok(())
}
