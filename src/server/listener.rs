use std::rc::{Rc, Weak};

use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing::info;

use crate::config::Config;
use crate::http::application::Application;
use crate::http::connection::Connection;
use crate::http::environ::ServerInfo;
use crate::http::transport::{run_writer, CloseReason, Protocol, TcpTransport};
use crate::server::ServerLoop;

const READ_BUFFER_SIZE: usize = 4096;

/// Binds the configured address and serves until the accept loop fails.
///
/// Must run inside a `tokio::task::LocalSet`.
pub async fn run(cfg: &Config, app: Rc<dyn Application>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    serve(listener, cfg, app).await
}

/// Accept loop over an already bound listener.
pub async fn serve(listener: TcpListener, cfg: &Config, app: Rc<dyn Application>) -> anyhow::Result<()> {
    let local_addr = listener.local_addr()?;
    let server_name = cfg
        .server_name
        .clone()
        .unwrap_or_else(|| local_addr.ip().to_string());
    let server_loop = Rc::new(ServerLoop::new());

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let server = ServerInfo {
            server_name: server_name.clone(),
            server_port: local_addr.port(),
            server_software: cfg.server_software.clone(),
            remote_addr: Some(peer.ip().to_string()),
        };
        let app = app.clone();
        let max_header_bytes = cfg.max_header_bytes;
        let server_loop = server_loop.clone();

        server_loop.connection_opened();
        tokio::task::spawn_local(async move {
            let handle = Rc::downgrade(&server_loop);
            if let Err(e) = handle_connection(socket, server, app, handle, max_header_bytes).await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
            server_loop.connection_closed();
        });
    }
}

/// Drives one connection: socket reads in, transport writes out.
async fn handle_connection(
    socket: TcpStream,
    server: ServerInfo,
    app: Rc<dyn Application>,
    event_loop: Weak<ServerLoop>,
    max_header_bytes: usize,
) -> anyhow::Result<()> {
    let (mut reader, writer) = socket.into_split();
    let (tx, rx) = mpsc::unbounded_channel();
    let transport = Rc::new(TcpTransport::new(tx));

    let mut conn = Connection::new(transport, app, server, event_loop)
        .with_max_header_bytes(max_header_bytes);
    let mut writer_task = tokio::task::spawn_local(run_writer(rx, writer));
    let mut writer_result = None;

    let mut temp = [0u8; READ_BUFFER_SIZE];
    let reason = loop {
        tokio::select! {
            read = reader.read(&mut temp) => match read {
                Ok(0) => break CloseReason::PeerClosed,
                Ok(n) => conn.data_received(&temp[..n]),
                Err(e) => break CloseReason::Error(e.to_string()),
            },
            done = &mut writer_task => {
                let reason = writer_close_reason(&done);
                writer_result = Some(done);
                break reason;
            }
        }
    };

    conn.connection_lost(reason);

    // The connection has closed the transport by now, so the writer drains
    // what is queued and exits.
    let done = match writer_result {
        Some(done) => done,
        None => writer_task.await,
    };
    done??;
    Ok(())
}

/// How a finished writer task ended the connection.
fn writer_close_reason(done: &Result<anyhow::Result<()>, JoinError>) -> CloseReason {
    match done {
        Ok(Ok(())) => CloseReason::Local,
        Ok(Err(e)) => CloseReason::Error(e.to_string()),
        Err(e) => CloseReason::Error(e.to_string()),
    }
}
