//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};
use parking_lot::Mutex;

use super::Connection;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Streams currently owned by a worker, so shutdown can unblock their reads
#[derive(Default)]
struct LiveConnections {
    next_id: AtomicU64,
    streams: Mutex<HashMap<u64, TcpStream>>,
}

impl LiveConnections {
    fn register(&self, stream: &TcpStream) -> std::io::Result<u64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = stream.try_clone()?;
        self.streams.lock().insert(id, handle);
        Ok(id)
    }

    fn unregister(&self, id: u64) {
        self.streams.lock().remove(&id);
    }

    /// Shut down every registered stream; returns how many were closed
    fn close_all(&self) -> usize {
        let streams = self.streams.lock();
        for stream in streams.values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        streams.len()
    }
}

/// TCP server for MmapKV
///
/// One acceptor thread (the caller of `run`) polls a non-blocking listener
/// and pushes accepted streams into a bounded channel drained by a fixed
/// pool of workers.
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    live: Arc<LiveConnections>,
}

impl Server {
    /// Bind the listen address from `config`
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            live: Arc::new(LiveConnections::default()),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Flag that stops `run` once set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Serve until shutdown is signalled (blocking)
    ///
    /// On shutdown, open connections are closed so idle clients do not keep
    /// workers blocked in a read; queued connections are dropped unserved.
    pub fn run(&self) -> Result<()> {
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_connections.max(1));
        let workers: Vec<JoinHandle<()>> = (0..self.config.worker_threads.max(1))
            .map(|id| self.spawn_worker(id, rx.clone()))
            .collect::<std::io::Result<_>>()?;
        drop(rx);

        while !self.shutdown.load(Ordering::Acquire) {
            match self.listener.accept() {
                Ok((stream, addr)) => match tx.try_send(stream) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("Connection queue full, dropping {}", addr);
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        drop(tx);
        let closed = self.live.close_all();
        tracing::info!("Shutting down, closed {} open connections", closed);
        for worker in workers {
            let _ = worker.join();
        }
        Ok(())
    }

    fn spawn_worker(&self, id: usize, rx: Receiver<TcpStream>) -> std::io::Result<JoinHandle<()>> {
        let engine = Arc::clone(&self.engine);
        let shutdown = Arc::clone(&self.shutdown);
        let live = Arc::clone(&self.live);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("mmapkv-worker-{}", id))
            .spawn(move || {
                for stream in rx.iter() {
                    let id = match live.register(&stream) {
                        Ok(id) => id,
                        Err(e) => {
                            tracing::warn!("Dropping connection: {}", e);
                            continue;
                        }
                    };
                    // Registered after close_all ran
                    if shutdown.load(Ordering::Acquire) {
                        live.unregister(id);
                        continue;
                    }

                    let result = Connection::new(stream, Arc::clone(&engine)).and_then(|mut conn| {
                        conn.set_timeouts(read_ms, write_ms)?;
                        conn.handle()
                    });
                    live.unregister(id);
                    if let Err(e) = result {
                        tracing::warn!("Connection ended with error: {}", e);
                    }
                }
            })
    }
}
