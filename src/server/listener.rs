use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::{Connection, ConnectionLimits};
use crate::routing::{HandlerContext, Router};

const BACKLOG: i32 = 1024;
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A pool of independent accept loops sharing one address.
///
/// Every worker owns its own listening socket bound with address and port
/// reuse, so the kernel spreads incoming connections across them. Workers
/// share nothing but the read-only route table and handler context.
pub struct Server {
    listeners: Vec<TcpListener>,
    local_addr: SocketAddr,
    router: Arc<Router>,
    ctx: Arc<HandlerContext>,
    limits: ConnectionLimits,
}

impl Server {
    /// Binds `cfg.workers` listeners on `cfg.listen_addr`.
    ///
    /// Port 0 is resolved by the first bind; the remaining workers join that port.
    pub fn bind(cfg: &Config, router: Arc<Router>, ctx: Arc<HandlerContext>) -> anyhow::Result<Self> {
        let requested: SocketAddr = cfg
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address {}", cfg.listen_addr))?;

        let first = bind_reuse(requested)?;
        let local_addr = first.local_addr()?;
        let mut listeners = vec![first];
        for _ in 1..cfg.workers {
            listeners.push(bind_reuse(local_addr)?);
        }

        info!("Listening on {} with {} workers", local_addr, listeners.len());

        Ok(Self {
            listeners,
            local_addr,
            router,
            ctx,
            limits: ConnectionLimits::from(cfg),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs every accept loop until one of them fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut workers = JoinSet::new();

        for (id, listener) in self.listeners.into_iter().enumerate() {
            workers.spawn(accept_loop(
                id,
                listener,
                self.router.clone(),
                self.ctx.clone(),
                self.limits,
            ));
        }

        while let Some(res) = workers.join_next().await {
            res.context("worker task failed")?;
        }

        Ok(())
    }
}

fn bind_reuse(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nonblocking(true)?;
    socket
        .bind(&addr.into())
        .with_context(|| format!("failed to bind {addr}"))?;
    socket.listen(BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    Ok(TcpListener::from_std(std_listener)?)
}

/// Accepts connections forever, serving each one to completion before the next.
async fn accept_loop(
    id: usize,
    listener: TcpListener,
    router: Arc<Router>,
    ctx: Arc<HandlerContext>,
    limits: ConnectionLimits,
) {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!(worker = id, error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        tracing::debug!(worker = id, %peer, "Accepted connection");

        // Handler panics surface here as a JoinError.
        let conn = Connection::new(socket, router.clone(), ctx.clone(), limits);
        match tokio::spawn(conn.run()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(worker = id, %peer, "Connection error: {:#}", e),
            Err(e) => error!(worker = id, %peer, "Connection task aborted: {}", e),
        }
    }
}
