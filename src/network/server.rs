//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, StrataError};

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TCP server for StrataKV
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listen address from the config
    ///
    /// Binding happens here rather than in `run` so callers can read the
    /// actual address (e.g. when listening on port 0).
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            StrataError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` when set; can be moved to another thread
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Start the server (blocking)
    ///
    /// Returns once shutdown is signalled and every worker has finished
    /// its current connection.
    pub fn run(&self) -> Result<()> {
        let (sender, receiver) = channel::unbounded::<TcpStream>();

        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for id in 0..self.config.worker_threads {
            let rx = receiver.clone();
            let engine = Arc::clone(&self.engine);
            let read_ms = self.config.read_timeout_ms;
            let write_ms = self.config.write_timeout_ms;

            let handle = thread::Builder::new()
                .name(format!("stratakv-worker-{id}"))
                .spawn(move || {
                    while let Ok(stream) = rx.recv() {
                        serve(stream, Arc::clone(&engine), read_ms, write_ms);
                    }
                })?;
            workers.push(handle);
        }
        // Workers hold their own receiver clones; drop ours.
        drop(receiver);

        tracing::info!(
            addr = %self.local_addr()?,
            workers = self.config.worker_threads,
            "server listening"
        );

        let accepted = self.accept_loop(&sender);

        // Closing the channel lets idle workers exit.
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::warn!("connection worker panicked");
            }
        }

        tracing::info!("server stopped");
        accepted
    }

    fn accept_loop(&self, sender: &channel::Sender<TcpStream>) -> Result<()> {
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    tracing::debug!(%peer, "accepted connection");
                    stream.set_nonblocking(false)?;
                    sender.send(stream).map_err(|_| {
                        StrataError::Network("all connection workers have exited".to_string())
                    })?;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept connection");
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }
        Ok(())
    }
}

/// Run one connection to completion on the current worker
fn serve(stream: TcpStream, engine: Arc<Engine>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, engine) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "failed to set up connection");
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!(peer = connection.peer_addr(), error = %e, "failed to set timeouts");
        return;
    }

    if let Err(e) = connection.handle() {
        tracing::debug!(peer = connection.peer_addr(), error = %e, "connection closed with error");
    }
}
