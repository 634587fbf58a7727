use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::router::Router;
use crate::server::session::Session;

/// Binds the configured address and serves forever.
///
/// Bind/listen failures are fatal and propagate to the caller; everything
/// after a successful bind runs the unbounded accept loop.
pub async fn run(cfg: &Config, router: Arc<Router>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!("Listening on {}", cfg.listen_addr);

    serve(listener, router).await
}

/// Accept loop over an already-bound listener.
///
/// Each accepted connection gets its own session task. A failed accept is
/// logged and the loop keeps going; session errors terminate only that
/// session.
pub async fn serve(listener: TcpListener, router: Arc<Router>) -> anyhow::Result<()> {
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                info!("Accepted connection from {}", peer);

                let router = router.clone();
                tokio::spawn(async move {
                    let mut session = Session::new(socket, router);
                    if let Err(e) = session.run().await {
                        error!("Session error from {}: {}", peer, e);
                    }
                });
            }

            Err(e) => {
                warn!("Accept failed: {}", e);
            }
        }
    }
}
