//! HTTP server — bind, serve, graceful shutdown.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// HTTP server wrapping the application router.
#[derive(Debug)]
pub struct HttpServer {
    listener: TcpListener,
    app: Router,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Bind the listener. Binding eagerly (instead of inside `serve`) lets
    /// callers read the local address before serving, e.g. with port 0.
    pub async fn bind(addr: SocketAddr, app: Router) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            app,
            cancel: CancellationToken::new(),
        })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle for requesting shutdown from elsewhere.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the server until cancelled or a fatal error occurs.
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = self.listener.local_addr()?;
        tracing::info!("HTTP server listening on {}", addr);

        let cancel = self.cancel.clone();
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("HTTP server shutting down");
            })
            .await
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
