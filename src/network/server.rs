//! TCP Server
//!
//! Accepts connections and runs each one on its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Result, TtlKvError};
use crate::protocol::{write_response, Response};
use crate::service::StoreService;
use crate::store::Store;

use super::Connection;

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for ttlkv
pub struct Server {
    config: Config,
    service: StoreService,
    listener: TcpListener,
    shutdown: ShutdownHandle,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, store: Arc<Store>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            TtlKvError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            service: StoreService::new(store),
            listener,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }

    /// Accept connections until shutdown is signalled (blocking)
    pub fn run(self) -> Result<()> {
        tracing::info!(addr = %self.local_addr()?, "server listening");

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, peer)) => self.dispatch(stream, peer),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("server stopped accepting connections");
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        if self.active_connections.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!(peer = %peer, max = self.config.max_connections, "rejecting connection");
            let mut stream = stream;
            let _ = stream.set_nonblocking(false);
            let _ = write_response(&mut stream, &Response::error("too many connections"));
            return;
        }

        let service = self.service.clone();
        let active = Arc::clone(&self.active_connections);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        active.fetch_add(1, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name(format!("ttlkv-conn-{}", peer))
            .spawn(move || {
                if let Err(e) = serve(stream, service, read_ms, write_ms) {
                    tracing::debug!(peer = %peer, error = %e, "connection closed with error");
                }
                active.fetch_sub(1, Ordering::SeqCst);
            });

        if let Err(e) = spawned {
            self.active_connections.fetch_sub(1, Ordering::SeqCst);
            tracing::error!(peer = %peer, error = %e, "failed to spawn connection thread");
        }
    }
}

fn serve(stream: TcpStream, service: StoreService, read_ms: u64, write_ms: u64) -> Result<()> {
    // Accepted sockets may inherit the listener's non-blocking mode
    stream.set_nonblocking(false)?;

    let mut connection = Connection::new(stream, service)?;
    connection.set_timeouts(read_ms, write_ms)?;
    connection.handle()
}
