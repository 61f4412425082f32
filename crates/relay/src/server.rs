//! TCP listener setup and the accept loop.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{session, state::RelayState};

/// Bind and run the relay. Never returns under normal operation.
pub async fn start(bind: &str, port: u16, state: Arc<RelayState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("{bind}:{port}")).await?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %listener.local_addr()?,
        "relay listening"
    );
    serve(listener, state).await
}

/// Accept loop over an already-bound listener (split out so tests can
/// bind an ephemeral port first).
///
/// Each connection gets its own task; accept errors are logged and the
/// loop keeps going.
pub async fn serve(listener: TcpListener, state: Arc<RelayState>) -> anyhow::Result<()> {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(session::handle_connection(stream, Arc::clone(&state)));
            },
            Err(error) => warn!(%error, "accept failed"),
        }
    }
}
