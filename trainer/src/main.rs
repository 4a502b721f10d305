use std::{env, io};

use log::{error, info};
use tokio::{net::TcpListener, signal};

use trainer::{Session, TrainerConfig};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "12345";

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let config = TrainerConfig::from_env()?;

    let addr = format!(
        "{}:{}",
        env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string()),
    );

    let listener = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    let (stream, peer) = listener.accept().await?;
    stream.set_nodelay(true)?;
    info!("simulator connected from {peer}");

    let (rx, tx) = stream.into_split();
    let (rx, tx) = comms::channel(rx, tx);
    let mut session = Session::new(rx, tx, config)?;

    tokio::select! {
        ret = session.run() => {
            match ret {
                Ok(summary) => info!(
                    rounds = summary.rounds,
                    epochs = summary.epochs;
                    "training finished"
                ),
                Err(e) => {
                    error!("session failed at epoch {}: {e}", session.epoch());
                    return Err(e.into());
                }
            }
        }
        _ = signal::ctrl_c() => {
            info!("received SIGINT, stopping at epoch {}", session.epoch());
        }
    }

    Ok(())
}
