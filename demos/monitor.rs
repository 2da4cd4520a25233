//! Monitor - print a receiver's state and follow its status updates.
//!
//! This example demonstrates:
//! - Building a connection with the fluent builder
//! - Querying registers and decoding their values
//! - Subscribing to connection events and unsolicited status frames
//!
//! # Running
//!
//! ```text
//! cargo run --example monitor -- 192.168.1.40
//! ```

use std::time::Duration;

use arcam_client::codec::{level, status, Source};
use arcam_client::protocol::{command, zone};
use arcam_client::{Connection, ConnectionEvent, Frame};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let host = std::env::args()
        .nth(1)
        .ok_or("usage: monitor <receiver-host>")?;

    let avr = Connection::builder(host)
        .heartbeat_interval(Duration::from_secs(15))
        .build()?;
    let mut events = avr.subscribe();

    avr.connect().await?;

    // Initial snapshot
    for cmd in [
        command::POWER,
        command::VOLUME,
        command::MUTE,
        command::CURRENT_SOURCE,
        command::BASS,
        command::TREBLE,
    ] {
        match avr.query(zone::MASTER, cmd).await {
            Ok(frame) => print_frame(&frame),
            Err(e) => eprintln!("query 0x{:02X} failed: {}", cmd, e),
        }
    }

    // Follow changes until interrupted
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ConnectionEvent::Status(frame)) => print_frame(&frame),
                Ok(ConnectionEvent::Reconnecting { attempt, delay }) => {
                    println!("link lost, retry #{} in {:?}", attempt, delay);
                }
                Ok(other) => println!("{:?}", other),
                Err(e) => eprintln!("event stream: {}", e),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    avr.disconnect().await?;
    Ok(())
}

fn print_frame(frame: &Frame) {
    let Some(value) = frame.value() else {
        println!("zone {} cmd 0x{:02X}: {:02X?}", frame.zone, frame.command, frame.data());
        return;
    };

    match frame.command {
        command::POWER => println!("power: {:?}", status::PowerState::from_code(value)),
        command::VOLUME => println!("volume: {}", value),
        command::MUTE => println!("muted: {:?}", status::decode_muted(value)),
        command::CURRENT_SOURCE => match Source::from_code(value) {
            Some(source) => println!("source: {}", source),
            None => println!("source: unknown (0x{:02X})", value),
        },
        command::BASS | command::TREBLE => {
            println!("tone 0x{:02X}: {:+} dB", frame.command, level::decode_signed(value));
        }
        _ => println!("zone {} cmd 0x{:02X}: {:02X?}", frame.zone, frame.command, frame.data()),
    }
}
