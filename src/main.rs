mod engine;
mod feed;
mod geo;
mod model;
mod normalize;
mod persist;
mod render;
mod store;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use engine::{Countdown, Engine};
use feed::FeedEvent;
use model::now_ms;
use persist::FileKvStore;
use render::ConsoleRenderer;

#[derive(Parser)]
#[command(name = "trainmap-arrivals")]
#[command(about = "Live train arrival board for the trainmap feed")]
struct Args {
    /// Websocket feed to subscribe to
    #[arg(long, env = "FEED_URL", default_value = "wss://trainmap.pv.lv/ws")]
    url: String,

    /// Station to select on startup (id or exact name)
    #[arg(short, long)]
    station: Option<String>,

    /// Cache file for the station catalog and selection
    #[arg(long, default_value = "trainmap_cache.json")]
    cache: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut engine = Engine::new(ConsoleRenderer::new(), FileKvStore::open(args.cache));
    if let Some(station) = args.station {
        engine.select(&station);
    }

    engine.set_status("connecting to feed");
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let reader = feed::spawn(args.url, tx);

    let mut countdown = Countdown::new();
    countdown.start();

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    FeedEvent::Connected => engine.set_status("feed open"),
                    FeedEvent::Message(msg) => {
                        if engine.handle_message(&msg, now_ms()) {
                            countdown.start();
                        }
                    }
                    FeedEvent::Disconnected => {
                        engine.set_status("feed closed, retrying in 5s");
                    }
                }
            }
            _ = countdown.tick() => engine.tick(now_ms()),
        }
    }

    info!("feed channel closed, shutting down");
    let _ = reader.join();
}
