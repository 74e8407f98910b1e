use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use darkrenderer_protocol::SessionConfig;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "DarkRenderer edge session controller")]
pub struct Args {
    /// IP address or interface name to listen on
    #[clap(
        short = 'i',
        long,
        env = "DARKRENDERER_EDGE_INTERFACE",
        default_value = "0.0.0.0"
    )]
    pub interface: String,

    /// Port to listen on
    #[clap(short = 'p', long, env = "DARKRENDERER_EDGE_PORT", default_value_t = 9000)]
    pub port: u16,

    /// Path to the JSON networking/processing config
    #[clap(long, env = "DARKRENDERER_CONFIG", value_name = "PATH")]
    pub config: PathBuf,

    /// Default task size (rays per task), used until a client sends CONFIG
    #[clap(long, value_name = "N", default_value_t = 1024)]
    pub task_size: usize,

    /// Default SuperTask chunk size offered to the cloud tracer
    #[clap(long, value_name = "N", default_value_t = 8)]
    pub task_chunk_size: usize,

    /// Route tasks across one queue per tracer instead of a single shared queue
    #[clap(long, default_value_t = false)]
    pub multiqueue: bool,

    /// Let tracers steal tasks from other queues once their own has drained
    #[clap(long, default_value_t = false)]
    pub task_stealing: bool,

    /// Use the cloud tracer's per-task streaming protocol instead of batched SuperTasks
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
        help = "Output details about sessions and tasks; specify multiple times for more detail"
    )]
    pub verbose: u8,
}

impl Args {
    pub fn socket_addr(&self) -> SocketAddr {
        let addr = self
            .interface
            .parse()
            .expect("invalid IP address or interface name");
        SocketAddr::new(addr, self.port)
    }

    pub fn default_session_config(&self) -> SessionConfig {
        SessionConfig {
            task_size: self.task_size,
            task_chunk_size: self.task_chunk_size,
            multiqueue: self.multiqueue,
            task_steal: self.task_stealing,
            cloud_streaming: self.cloud_streaming,
        }
    }
}
