//! Server Implementation
//!
//! HTTP 服务器启动和管理

use socketioxide::SocketIo;

use crate::api;
use crate::core::{Config, ServerState};
use crate::realtime;

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        // Socket.IO layer is built here and handed to the state as an
        // explicit dependency; route handlers broadcast through the relay
        // rather than a process-wide global.
        let (socket_layer, io) = SocketIo::builder().build_layer();

        let state = ServerState::initialize(&self.config, io).await?;

        // Register the realtime namespace (auth + client event handlers)
        realtime::register(&state);

        let app = api::create_router(state.clone()).layer(socket_layer);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("TapTab POS Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
