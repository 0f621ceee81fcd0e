//! The network part of irori.
//!
//! One task accepts connections; every accepted peer gets its own task that
//! shuttles bytes between the socket and the shared [`State`]: framed lines
//! go in through `handle_message`, queued replies come out through the peer's
//! message queue.

use crate::state::State;
use irori_reader::IrcReader;
use irori_tokens::Message;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

const BACKLOG: i32 = 10;

/// Binds the listening socket and hands it to the reactor.
///
/// SO_REUSEADDR is set so that quick restarts don't trip on TIME_WAIT, and
/// the socket is non-blocking like every other socket irori touches.  Must be
/// called from within the runtime.
pub fn bind(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(BACKLOG)?;
    socket.set_nonblocking(true)?;
    TcpListener::from_std(socket.into())
}

/// Accepts clients forever.
pub async fn accept_loop(mut listener: TcpListener, state: State) {
    loop {
        match listener.accept().await {
            Ok((conn, peer)) => {
                log::info!("New connection from {}", peer);
                tokio::spawn(handle(conn, peer, state.clone()));
            }
            Err(err) => {
                log::warn!("Failed to accept a connection: {}", err);
            }
        }
    }
}

/// Drives one client connection.
///
/// The task ends when the peer disconnects, when an I/O error demotes it to a
/// disconnection, or when the state drops the peer's message queue (QUIT).
/// Empty lines are dropped before dispatch.
async fn handle(conn: TcpStream, peer: SocketAddr, state: State) {
    let (read_half, mut write_half) = tokio::io::split(conn);
    let mut reader = IrcReader::new(read_half);
    let (msg_queue, mut outgoing_msgs) = mpsc::unbounded_channel();
    let id = state.peer_joined(peer, msg_queue).await;

    loop {
        tokio::select! {
            item = outgoing_msgs.recv() => match item {
                Some(item) => {
                    let bytes: &[u8] = item.as_ref();
                    if let Err(err) = write_half.write_all(bytes).await {
                        log::debug!("{}: Failed to write: {}", peer, err);
                        state.peer_quit(id).await;
                        break;
                    }
                }
                None => break,
            },
            line = reader.read_line() => match line {
                Ok(Some(line)) => {
                    if let Some(msg) = Message::parse(&line) {
                        state.handle_message(id, msg).await;
                    }
                }
                Ok(None) => {
                    state.peer_quit(id).await;
                    break;
                }
                Err(err) => {
                    log::debug!("{}: Failed to read: {}", peer, err);
                    state.peer_quit(id).await;
                    break;
                }
            },
        }
    }
}
