//! HTTP status and configuration API

pub mod server;

pub use server::ApiServer;

use crate::error::{ProvisorError, Result};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

/// Best-effort reachability check: resolve the domain and attempt a TCP
/// connect to 443, falling back to 80, with a 5 second cap per port.
pub async fn test_connection(domain: &str) -> Result<()> {
    try_ports(domain, &[443, 80]).await
}

async fn try_ports(domain: &str, ports: &[u16]) -> Result<()> {
    let mut last_error = String::new();
    for &port in ports {
        let target = format!("{}:{}", domain, port);
        debug!(target = %target, "Attempting connection");
        match timeout(Duration::from_secs(5), TcpStream::connect(target.as_str())).await {
            Ok(Ok(_stream)) => {
                info!(domain = %domain, port = port, "Connection check succeeded");
                return Ok(());
            }
            Ok(Err(err)) => last_error = err.to_string(),
            Err(_) => last_error = format!("timed out connecting to port {}", port),
        }
    }
    Err(ProvisorError::Network {
        message: format!("{} is not reachable: {}", domain, last_error),
    })
}
