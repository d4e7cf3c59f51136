use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use dogwalk::app::{Application, Strand};
use dogwalk::players::Players;
use dogwalk::ticker::Ticker;
use dogwalk::{api, config};

// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the JSON game configuration
    #[clap(short = 'c', long, value_name = "file")]
    config_file: PathBuf,

    /// Root directory of the static content to serve
    #[clap(short = 'w', long, value_name = "dir")]
    www_root: PathBuf,

    /// Tick period in milliseconds; omit to disable the built-in ticker
    /// and enable the manual tick endpoint instead
    #[clap(short = 't', long, value_name = "milliseconds")]
    tick_period: Option<u64>,

    /// Spawn dogs at random road positions instead of the first road's
    /// start vertex
    #[clap(long)]
    randomize_spawn_points: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Warning: RUST_LOG environment variable not set. Set it to display logs!");
        eprintln!("Recommended: RUST_LOG=info cargo run");
    }

    let args = Args::parse();

    let mut game = match config::load_game(&args.config_file) {
        Ok(game) => game,
        Err(e) => {
            error!("server exited: code=1 exception={e}");
            return Err(e.into());
        }
    };
    game.set_randomize_spawn(args.randomize_spawn_points);

    if !args.www_root.is_dir() {
        let message = format!(
            "static root {} is not a directory or doesn't exist",
            args.www_root.display()
        );
        error!("server exited: code=1 exception={message}");
        return Err(message.into());
    }

    let strand = Strand::spawn(Application::new(game, Players::new()));

    // Without a tick period the world clock is driven through the HTTP
    // tick endpoint.
    let manual_tick = args.tick_period.is_none();
    if let Some(period) = args.tick_period {
        info!("ticker armed: period_ms={period}");
        Ticker::new(strand.clone(), Duration::from_millis(period)).start();
    }

    let router = api::router(strand, manual_tick, args.www_root);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server started: address={addr}");

    // In-flight requests are abandoned on shutdown; there is no drain.
    tokio::select! {
        result = axum::serve(listener, router).into_future() => { result?; }
        _ = shutdown_signal() => {}
    }

    info!("server exited: code=0");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {}
        _ = terminate => {}
    }
}
