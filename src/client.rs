//! Client data and the queue of messages waiting to be sent to them.

use irori_tokens::{Buffer, ReplyBuffer};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Stable identifier of one connection; the slab key in the server registry.
///
/// Channels refer to their members by id, never by reference, so that a
/// disconnecting client cannot leave anything dangling behind.
pub type ClientId = usize;

/// A batch of messages to be written out to a peer, as one cheaply clonable
/// blob of CR-LF terminated lines.
#[derive(Clone, Debug)]
pub struct MessageQueueItem(Arc<String>);

impl From<Buffer> for MessageQueueItem {
    fn from(buffer: Buffer) -> MessageQueueItem {
        MessageQueueItem(Arc::new(buffer.build()))
    }
}

impl From<ReplyBuffer> for MessageQueueItem {
    fn from(buffer: ReplyBuffer) -> MessageQueueItem {
        MessageQueueItem(Arc::new(buffer.build()))
    }
}

impl AsRef<str> for MessageQueueItem {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for MessageQueueItem {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// The queue used by the state to push messages back to a peer's connection
/// task.
pub type MessageQueue = mpsc::UnboundedSender<MessageQueueItem>;

/// Identity and registration state of one connected peer.
pub struct Client {
    queue: MessageQueue,

    /// The remote address, captured at accept time.  Used in the sender mask.
    ip: String,

    /// Identity strings.  Empty until the matching NICK/USER succeeds.
    nickname: String,
    username: String,
    realname: String,

    /// Whether a PASS with the right password has been seen.
    pass_ok: bool,

    /// Latched by `try_register`, never cleared.
    registered: bool,
}

impl Client {
    pub fn new(queue: MessageQueue, ip: String) -> Client {
        Client {
            queue,
            ip,
            nickname: String::new(),
            username: String::new(),
            realname: String::new(),
            pass_ok: false,
            registered: false,
        }
    }

    /// Pushes a message onto the outgoing queue.
    ///
    /// The push fails when the connection task is gone; the error is dropped
    /// since the peer is about to be reaped anyway.
    pub fn send(&self, msg: impl Into<MessageQueueItem>) {
        let _ = self.queue.send(msg.into());
    }

    pub fn nick(&self) -> &str {
        &self.nickname
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn set_nickname(&mut self, nickname: &str) {
        self.nickname = nickname.to_owned();
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = username.to_owned();
    }

    pub fn set_realname(&mut self, realname: &str) {
        self.realname = realname.to_owned();
    }

    pub fn set_pass_ok(&mut self, pass_ok: bool) {
        self.pass_ok = pass_ok;
    }

    /// Latches `registered` once the whole PASS/NICK/USER handshake is in.
    ///
    /// Returns whether this call made the transition.
    pub fn try_register(&mut self) -> bool {
        if self.registered || !self.pass_ok || self.nickname.is_empty() || self.username.is_empty()
        {
            return false;
        }
        self.registered = true;
        log::debug!("{} registered ({})", self.full_name(), self.realname);
        true
    }

    /// The mask other clients see this client as: `nick!user@ip`.
    pub fn full_name(&self) -> String {
        format!("{}!{}@{}", self.nickname, self.username, self.ip)
    }
}
