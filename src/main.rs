use log::{error, info};
use mqtt_codec::{Connection, Packet};
use tokio::io;

/// Prints every packet found in a raw MQTT byte stream read from stdin.
#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let mut connection = Connection::new(io::stdin());
    let mut count = 0usize;

    loop {
        let frame = match connection.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                error!("Error reading stream after {count} packets: {e}");
                return Err(io::Error::other(e));
            }
        };

        match Packet::decode(&frame) {
            Ok((packet, _)) => {
                count += 1;
                println!("{packet}");
            }
            Err(e) => error!("Skipping undecodable frame {}: {e}", hex::encode(&frame)),
        }
    }

    info!("Decoded {count} packets");

    Ok(())
}
