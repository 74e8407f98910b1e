//! The JSON configuration file shared by every process role: `edge.ip/port`,
//! `cloud.ip/port`, `networking.*`, and `processing.*`, as named in the
//! external-interfaces contract. Loaded once at startup with `serde_json`;
//! CLI flags (parsed separately with `clap` in each binary's `Args`) override
//! these values where both are present.

use std::path::Path;

use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub edge: Endpoint,
    pub cloud: Endpoint,
    pub networking: NetworkingConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Endpoint {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkingConfig {
    pub compression: bool,
    pub recv_buffer_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    pub cpu: TracerConfig,
    #[serde(default)]
    pub fpga: TracerConfig,
    #[serde(default)]
    pub cloud: CloudTracerConfig,
    pub multiqueue: bool,
    pub task_size: usize,
    pub task_steal: bool,
}

/// `mode`/`factor` describe how a tracer should be driven (e.g. multicore vs
/// single-core for CPU, single vs multi-accelerator for FPGA); neither the
/// dispatcher nor the tracer implementations interpret `factor` themselves —
/// it is forwarded for the external collaborators named in the scope this
/// covers, same as `mode`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TracerConfig {
    pub active: bool,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub factor: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CloudTracerConfig {
    pub active: bool,
    #[serde(default)]
    pub factor: Option<f64>,
    #[serde(default)]
    pub task_chunk_size: Option<usize>,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_config_document() {
        let json = r#"{
            "edge": {"ip": "0.0.0.0", "port": 9000},
            "cloud": {"ip": "10.0.0.5", "port": 9100},
            "networking": {"compression": true, "recv_buffer_size": 65536},
            "processing": {
                "cpu": {"active": true, "mode": "multicore"},
                "fpga": {"active": false},
                "cloud": {"active": true, "task_chunk_size": 8},
                "multiqueue": true,
                "task_size": 1024,
                "task_steal": false
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.edge.port, 9000);
        assert_eq!(cfg.cloud.ip, "10.0.0.5");
        assert!(cfg.networking.compression);
        assert_eq!(cfg.processing.cloud.task_chunk_size, Some(8));
        assert!(!cfg.processing.fpga.active);
    }

    #[test]
    fn fpga_and_cloud_sections_default_when_absent() {
        let json = r#"{
            "edge": {"ip": "0.0.0.0", "port": 9000},
            "cloud": {"ip": "10.0.0.5", "port": 9100},
            "networking": {"compression": false, "recv_buffer_size": 4096},
            "processing": {
                "cpu": {"active": true},
                "multiqueue": false,
                "task_size": 256,
                "task_steal": false
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert!(!cfg.processing.fpga.active);
        assert!(!cfg.processing.cloud.active);
    }
}
