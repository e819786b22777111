//! Ephemeral port allocation.

use tokio::net::TcpListener;

use crate::error::SupervisorError;

/// Obtain an unused ephemeral port from the operating system.
///
/// Binds a transient listener to port 0, reads back the port the OS
/// assigned, and releases the socket immediately so the worker process
/// can bind it. There is no free-list: every call asks the OS afresh,
/// which is what keeps live workers' ports from being handed out again.
pub async fn allocate_port() -> Result<u16, SupervisorError> {
    let listener = TcpListener::bind(("127.0.0.1", 0))
        .await
        .map_err(SupervisorError::NoPortAvailable)?;

    let port = listener
        .local_addr()
        .map_err(SupervisorError::NoPortAvailable)?
        .port();

    // Listener dropped here; the port is free for the worker to bind.
    Ok(port)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
