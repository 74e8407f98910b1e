use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "DarkRenderer command-line client")]
pub struct Args {
    /// What this invocation does: run a rendering session, or ask the edge to shut down
    #[clap(value_enum, long, default_value_t = Mode::Client)]
    pub mode: Mode,

    /// Edge hostname or IP address; overrides `edge.ip` from `--config` when given
    #[clap(long, env = "DARKRENDERER_EDGE_HOST")]
    pub edge_host: Option<String>,

    /// Edge port; overrides `edge.port` from `--config` when given
    #[clap(long, env = "DARKRENDERER_EDGE_PORT")]
    pub edge_port: Option<u16>,

    /// Path to the JSON networking/processing config, for default edge
    /// address and compression setting; CLI flags above take precedence
    #[clap(long, env = "DARKRENDERER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path to a scene file already in the edge's wire format (triangle ids,
    /// triangle vertices, then either a `CAM` block or explicit rays)
    #[clap(long, value_name = "PATH")]
    pub scene: Option<PathBuf>,

    /// Send the scene's camera instead of pre-generated rays
    #[clap(long, default_value_t = false)]
    pub send_cam: bool,

    /// Enable zlib compression of every frame (must match the edge's networking.compression)
    #[clap(long, default_value_t = false)]
    pub compress: bool,

    /// Override the edge's task size (rays per task) for this session
    #[clap(long, value_name = "N")]
    pub task_size: Option<usize>,

    /// Override the cloud tracer's SuperTask chunk size for this session
    #[clap(long, value_name = "N")]
    pub task_chunk_size: Option<usize>,

    /// Ask the edge to route tasks across one queue per tracer
    #[clap(long, default_value_t = false)]
    pub multiqueue: bool,

    /// Ask the edge to allow tracers to steal tasks from other queues
    #[clap(long, default_value_t = false)]
    pub task_stealing: bool,

    /// Ask the edge to use the cloud tracer's streaming protocol
    #[clap(long, default_value_t = false)]
    pub cloud_streaming: bool,

    /// Keep quiet and only log errors
    #[clap(short, long, conflicts_with = "verbose", default_value_t = false)]
    pub quiet: bool,

    #[clap(
        short = 'v',
        long,
        conflicts_with = "quiet",
        action = clap::ArgAction::Count,
        help = "Output details about the session; specify multiple times for more detail"
    )]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Client,
    ShutdownEdge,
    ShutdownAll,
}
