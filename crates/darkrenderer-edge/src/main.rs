//! Edge session controller: accepts one client connection at a time,
//! negotiates session config, partitions and dispatches its scene across
//! CPU/FPGA/cloud tracers, and emits results back to the client in arrival
//! order.

mod args;
mod error;
mod session;
mod tracers;

use std::net::TcpListener;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::{Acquire, Release};

use clap::Parser;
use darkrenderer_common::config::Config;
use tracing::{debug, error, info, warn};

use args::Args;
use session::SessionOutcome;

static KEEP_RUNNING: AtomicBool = AtomicBool::new(true);

fn main() {
    set_ctrlc_handler();

    let args = Args::parse();
    enable_logging(&args);
    debug!("{args:?}");

    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        error!("loading config {}: {e}", args.config.display());
        std::process::exit(1);
    });

    let addr = args.socket_addr();
    let listener = TcpListener::bind(addr).unwrap_or_else(|e| {
        error!("binding {addr}: {e}");
        std::process::exit(1);
    });
    info!("edge listening on {addr}");

    let default_cfg = args.default_session_config();

    for incoming in listener.incoming() {
        if !KEEP_RUNNING.load(Acquire) {
            break;
        }

        let stream = match incoming {
            Ok(stream) => stream,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };

        match session::run_session(stream, &config, default_cfg) {
            Ok(SessionOutcome::Continue) => {}
            Ok(SessionOutcome::ExitEdge) => {
                info!("received EXIT_EDGE, shutting down listener");
                break;
            }
            Ok(SessionOutcome::ExitAll) => {
                info!("received EXIT_ALL, notifying cloud peer");
                session::notify_cloud_exit(&config);
                break;
            }
            Err(e) => warn!("session aborted: {e}"),
        }
    }

    info!("edge finished");
}

fn set_ctrlc_handler() {
    ctrlc::set_handler(|| {
        KEEP_RUNNING.store(false, Release);
    })
    .expect("error setting Ctrl-C handler");
}

fn enable_logging(args: &Args) {
    let mut builder = tracing_subscriber::fmt().compact();

    if args.quiet {
        builder = builder.with_max_level(tracing::Level::ERROR);
    } else {
        match args.verbose {
            2.. => builder = builder.with_max_level(tracing::Level::TRACE),
            1 => builder = builder.with_max_level(tracing::Level::DEBUG),
            _ => builder = builder.with_max_level(tracing::Level::INFO),
        }
    }

    builder.init();
}
