// src/listener.rs
//! Liveness placeholder: bind a TCP port, accept exactly one connection, and
//! never read from or write to it. No protocol is served.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct BootstrapListener {
    local_addr: SocketAddr,
    accepted: Arc<AtomicBool>,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl BootstrapListener {
    /// Bind `host:port` and start the one-shot accept task. Bind failures
    /// (address in use, bad host) are returned, never retried.
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        tracing::info!(host, port, "opening port");
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("binding liveness port {host}:{port}"))?;
        let local_addr = listener.local_addr().context("reading bound address")?;

        let accepted = Arc::new(AtomicBool::new(false));
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let flag = accepted.clone();

        let join = tokio::spawn(async move {
            tokio::select! {
                res = listener.accept() => match res {
                    Ok((conn, peer)) => {
                        flag.store(true, Ordering::Release);
                        tracing::info!(%peer, "liveness port accepted a connection");
                        // Hold both sockets open, untouched, until shutdown.
                        let _ = stop_rx.changed().await;
                        drop(conn);
                    }
                    Err(e) => {
                        tracing::warn!("liveness accept failed: {e}");
                        let _ = stop_rx.changed().await;
                    }
                },
                _ = stop_rx.changed() => {}
            }
            drop(listener);
            tracing::debug!(%local_addr, "liveness port closed");
        });

        tracing::info!(%local_addr, "opened port");
        Ok(Self {
            local_addr,
            accepted,
            stop_tx,
            join,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// True once the single accept has completed.
    pub fn has_accepted(&self) -> bool {
        self.accepted.load(Ordering::Acquire)
    }

    /// Close the port (and the accepted connection, if any).
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            tracing::error!("liveness task ended abnormally: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port_on_loopback() {
        let l = BootstrapListener::bind("127.0.0.1", 0).await.unwrap();
        assert_ne!(l.local_addr().port(), 0);
        assert!(!l.has_accepted());
        l.shutdown().await;
    }
}
