use anyhow::{Context, Result};
use clap::Parser;
use hearth_http::{Router, Server, ServerConfig};
use socket2::{Domain, Protocol, Socket, Type};
use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

const ADDR: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 4221);
const BACKLOG: i32 = 1024;

#[derive(Parser)]
#[command(name = "hearth_http")]
#[command(about = "Minimal HTTP/1.1 server", long_about = None)]
struct Cli {
    /// Base directory for `/files/` (created if missing). Without it the
    /// file routes answer 404.
    #[arg(long)]
    directory: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = match &cli.directory {
        Some(dir) => ServerConfig::with_directory(dir)
            .with_context(|| format!("cannot use {} as base directory", dir.display()))?,
        None => ServerConfig::default(),
    };

    let listener = bind(ADDR).with_context(|| format!("cannot listen on {ADDR}"))?;
    tracing::info!(
        addr = %ADDR,
        directory = ?config.directory(),
        "listening"
    );

    Server::builder()
        .listener(listener)
        .handler(Router::new(config))
        .build()
        .launch()
        .await;

    Ok(())
}

fn bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;

    TcpListener::from_std(socket.into())
}
