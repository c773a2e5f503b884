use clap::Parser;
use std::path::PathBuf;

/// Mock server answering requests from OpenAPI/Swagger descriptions
#[derive(Parser, Debug, Clone)]
#[command(name = "swagtomock", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SWAGTOMOCK_CONFIG", default_value = "swagtomock.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "SWAGTOMOCK_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, env = "SWAGTOMOCK_PORT")]
    pub port: Option<u16>,

    /// Folder containing the description documents
    #[arg(short, long, env = "SWAGTOMOCK_FOLDER")]
    pub folder: Option<String>,

    /// Server URL prefix stripped from each document's base URL
    #[arg(long, env = "SWAGTOMOCK_URL")]
    pub url: Option<String>,

    /// Local mount prefix substituted for the stripped URL
    #[arg(long, env = "SWAGTOMOCK_LOCAL_URL")]
    pub local_url: Option<String>,

    /// Maximum revisits of one reference path before it is cut
    #[arg(long, env = "SWAGTOMOCK_MAX_LOOPS")]
    pub max_loops: Option<usize>,

    /// Preferred response content type
    #[arg(long, env = "SWAGTOMOCK_CONTENT_TYPE")]
    pub content_type: Option<String>,
}
