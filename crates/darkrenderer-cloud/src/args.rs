use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "DarkRenderer cloud session controller")]
pub struct Args {
    /// IP address or interface name to listen on
    #[clap(
        short = 'i',
        long,
        env = "DARKRENDERER_CLOUD_INTERFACE",
        default_value = "0.0.0.0"
    )]
    pub interface: String,

    /// Port to listen on
    #[clap(short = 'p', long, env = "DARKRENDERER_CLOUD_PORT", default_value_t = 9100)]
    pub port: u16,

    /// Path to the JSON networking/processing config
    #[clap(long, env = "DARKRENDERER_CONFIG", value_name = "PATH")]
    pub config: PathBuf,

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
}
