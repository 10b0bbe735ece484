use std::net::IpAddr;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct ClientArgs {
    /// Address of the first name server to contact, normally a root server
    pub server: IpAddr,

    /// Start queries over TCP instead of UDP
    #[arg(short, long, default_value_t = false)]
    pub tcp: bool,

    /// Seconds to wait for a UDP reply
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Optional deadline in seconds for TCP exchanges
    #[arg(long)]
    pub tcp_timeout: Option<u64>,
}

impl ClientArgs {
    pub fn from_env() -> Self {
        Self::parse()
    }
}
