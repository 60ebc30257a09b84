//! Server builder and accept loop.
//!
//! Ties the layers together: transport accepts connections, the handler
//! frames and decodes them, the coordinator owns the game state.

use omok_transport::{Transport, WebSocketListener};
use tokio::sync::mpsc;

use crate::coordinator::{Coordinator, CoordinatorMessage};
use crate::handler::handle_connection;
use crate::ArenaError;

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), omok_arena::ArenaError> {
/// use omok_arena::ServerBuilder;
///
/// let server = ServerBuilder::new().bind("0.0.0.0:3001").build().await?;
/// server.run().await
/// # }
/// ```
pub struct ServerBuilder {
    bind_addr: String,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener and spawns the coordinator task.
    pub async fn build(self) -> Result<Server, ArenaError> {
        let listener = WebSocketListener::bind(&self.bind_addr).await?;

        let (queue, receiver) = mpsc::unbounded_channel();
        tokio::spawn(Coordinator::new(receiver).run());

        Ok(Server { listener, queue })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running omok-arena server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server {
    listener: WebSocketListener,
    queue: mpsc::UnboundedSender<CoordinatorMessage>,
}

impl Server {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop: each connection gets its own handler task.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ArenaError> {
        tracing::info!("omok-arena server running");

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let queue = self.queue.clone();
                    tokio::spawn(async move {
                        if let Err(error) =
                            handle_connection(conn, queue).await
                        {
                            tracing::debug!(
                                %error,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(error) => {
                    tracing::error!(%error, "accept failed");
                }
            }
        }
    }
}
