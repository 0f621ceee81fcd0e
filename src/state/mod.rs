//! Shared state and API to handle incoming commands.
//!
//! This module is split in two files:
//!
//! - `mod.rs`: public API of the server state and send utilities
//! - `commands.rs`: handlers for the supported verbs

use crate::channel::Channel;
use crate::client::{Client, ClientId, MessageQueue, MessageQueueItem};
use crate::config::StateConfig;
use crate::lines;
use irori_tokens::{rpl, Command, Message, ReplyBuffer};
use slab::Slab;
use std::collections::HashMap;
use std::sync::Arc;
use std::{cmp, net};
use tokio::sync::Mutex;

mod commands;

type ChannelMap = HashMap<String, Channel>;
type HandlerResult = Result<(), ()>;

pub struct CommandContext<'a> {
    id: ClientId,
    rb: &'a mut ReplyBuffer,
}

/// State of the IRC network.
///
/// This is what the rest of irori talks to in order to keep a consistent view
/// of clients and channels.  Note that this is just an `Arc` to the real
/// data, so it's cheap to clone and clones share the same data.
///
/// All mutations go through the inner mutex, so handlers run to completion
/// one at a time.
///
/// # Example
///
/// ```rust
/// # use irori::config::StateConfig;
/// # use irori::state::State;
/// # use irori_tokens::Message;
/// # let mut runtime = tokio::runtime::Builder::new().basic_scheduler().build().unwrap();
/// # runtime.block_on(async {
/// let state = State::new(StateConfig {
///     password: "pw".to_owned(),
///     ..StateConfig::default()
/// });
///
/// // The state identifies each connection by the id returned at join time,
/// // and pushes the messages meant for it onto the given queue.
/// let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 12345));
/// let (msg_queue, mut outgoing_msgs) = tokio::sync::mpsc::unbounded_channel();
/// let id = state.peer_joined(addr, msg_queue).await;
///
/// // `handle_message` is used to pass messages from the client to the state.
/// let pass = Message::parse("PASS pw\r\n").unwrap();
/// let nick = Message::parse("NICK ser\r\n").unwrap();
/// let user = Message::parse("USER ser 0 * :ser\r\n").unwrap();
/// state.handle_message(id, pass).await;
/// state.handle_message(id, nick).await;
/// state.handle_message(id, user).await;
///
/// // The client has registered, so the state has pushed the welcome reply
/// // onto the queue.  Outgoing messages implement `AsRef<str>` and
/// // `AsRef<[u8]>`; one queue item can hold several IRC lines.
/// let msg = outgoing_msgs.recv().await.unwrap();
/// let msg: &str = msg.as_ref();
/// assert_eq!(msg, ":server 001 ser :Welcome to the IRC server ser!\r\n");
/// # });
/// ```
#[derive(Clone)]
pub struct State(Arc<Mutex<StateInner>>);

impl State {
    /// Initializes the IRC state from the given configuration.
    pub fn new(config: StateConfig) -> State {
        State(Arc::new(Mutex::new(StateInner::new(config))))
    }

    /// Adds a new connection to the state and returns the id it is known by.
    ///
    /// The queue is used to push messages back to the peer.
    pub async fn peer_joined(&self, addr: net::SocketAddr, queue: MessageQueue) -> ClientId {
        self.0.lock().await.peer_joined(addr, queue)
    }

    /// Removes the given connection from the state.
    ///
    /// This is the teardown path for peers that disconnect without QUIT; no
    /// message is sent on their behalf.
    pub async fn peer_quit(&self, id: ClientId) {
        self.0.lock().await.peer_quit(id);
    }

    /// Updates the state according to the given message from the given
    /// client.
    pub async fn handle_message(&self, id: ClientId, msg: Message<'_>) {
        self.0.lock().await.handle_message(id, msg);
    }
}

/// The actual shared data (state) of the IRC server.
pub(crate) struct StateInner {
    /// The prefix of server-originated replies.
    domain: String,

    /// The global password.  Clients need to issue a PASS command with this
    /// password to register.
    password: String,

    /// Modes applied at the creation of new channels.
    default_chan_mode: String,

    /// Every connected peer, keyed by connection id.
    clients: Slab<Client>,

    /// Every channel, keyed by its name.
    channels: ChannelMap,
}

impl StateInner {
    pub fn new(config: StateConfig) -> StateInner {
        StateInner {
            domain: config.domain,
            password: config.password,
            default_chan_mode: config.default_chan_mode,
            clients: Slab::new(),
            channels: HashMap::new(),
        }
    }

    pub fn peer_joined(&mut self, addr: net::SocketAddr, queue: MessageQueue) -> ClientId {
        let id = self.clients.insert(Client::new(queue, addr.ip().to_string()));
        log::debug!("{}: Connected from {}", id, addr);
        id
    }

    /// Cleanup needed when a client disconnects:
    ///
    /// - remove the client from each channel it was in,
    /// - remove channels left without members,
    /// - release the client record.
    ///
    /// The channel sweep runs before the release, so no channel ever holds
    /// the id of a gone client.
    pub fn peer_quit(&mut self, id: ClientId) {
        if !self.clients.contains(id) {
            return;
        }
        log::debug!("{}: Disconnected", id);
        self.channels.retain(|_, channel| {
            channel.remove_member(id);
            !channel.members.is_empty()
        });
        self.clients.remove(id);
    }

    pub fn handle_message(&mut self, id: ClientId, msg: Message<'_>) {
        let client = match self.clients.get(id) {
            Some(client) => client,
            None => return,
        };
        let mut rb = ReplyBuffer::new(&self.domain);

        let command = match msg.command {
            Ok(command) => command,
            Err(unknown) => {
                if client.is_registered() {
                    rb.reply(rpl::ERR_UNKNOWNCOMMAND)
                        .param(unknown.to_ascii_uppercase())
                        .trailing_param(lines::UNKNOWN_COMMAND);
                } else {
                    rb.reply(rpl::ERR_NOTREGISTERED).trailing_param(lines::NOT_REGISTERED);
                }
                client.send(rb);
                return;
            }
        };

        if !client.is_registered() {
            if !matches!(command, Command::Pass | Command::Nick | Command::User) {
                log::debug!("{}: {} rejected before registration", id, command);
                rb.reply(rpl::ERR_NOTREGISTERED).trailing_param(lines::NOT_REGISTERED);
                client.send(rb);
                return;
            }
        } else if matches!(command, Command::Pass | Command::Nick | Command::User) {
            rb.reply(rpl::ERR_UNKNOWNCOMMAND)
                .param(command.as_str())
                .trailing_param(lines::UNKNOWN_COMMAND);
            client.send(rb);
            return;
        }

        if !msg.has_enough_params() {
            match command {
                Command::Nick => {
                    rb.reply(rpl::ERR_NONICKNAMEGIVEN).trailing_param(lines::NO_NICKNAME_GIVEN);
                }
                _ => {
                    rb.reply(rpl::ERR_NEEDMOREPARAMS)
                        .param(command.as_str())
                        .trailing_param(lines::NEED_MORE_PARAMS);
                }
            }
            client.send(rb);
            return;
        }

        let ps = msg.params;
        let n = msg.num_params;
        let ctx = CommandContext { id, rb: &mut rb };

        log::debug!("{}: {} {:?}", id, command, &ps[..n]);
        let _ = match command {
            Command::Invite => self.cmd_invite(ctx, ps[0], ps[1]),
            Command::Join => self.cmd_join(ctx, ps[0], ps[1]),
            Command::Kick => {
                self.cmd_kick(ctx, ps[0], ps[1], if n < 3 { None } else { Some(ps[2]) })
            }
            Command::Mode => self.cmd_mode(ctx, ps[0], ps[1], &ps[2..cmp::max(2, n)]),
            Command::Nick => self.cmd_nick(ctx, ps[0]),
            Command::Part => self.cmd_part(ctx, ps[0], if n < 2 { None } else { Some(ps[1]) }),
            Command::Pass => self.cmd_pass(ctx, ps[0]),
            Command::Ping => self.cmd_ping(ctx, ps[0]),
            Command::PrivMsg => self.cmd_privmsg(ctx, ps[0], ps[1]),
            Command::Quit => self.cmd_quit(ctx, if n == 0 { None } else { Some(ps[0]) }),
            Command::Topic => {
                self.cmd_topic(ctx, ps[0], if n < 2 { None } else { Some(ps[1]) })
            }
            Command::User => self.cmd_user(ctx, ps[0], ps[3]),
            Command::Pong | Command::Reply(_) => Ok(()),
        };

        if !rb.is_empty() {
            self.send(id, MessageQueueItem::from(rb));
        }
    }
}

/// Returns `Ok(channel)` when `name` is an existing channel name.  Otherwise
/// sends a 403 reply and returns `Err(())`.
fn find_channel<'a>(
    id: ClientId,
    rb: &mut ReplyBuffer,
    channels: &'a ChannelMap,
    name: &str,
) -> Result<&'a Channel, ()> {
    match channels.get(name) {
        Some(channel) => Ok(channel),
        None => {
            log::debug!("{}:     no such channel {:?}", id, name);
            rb.reply(rpl::ERR_NOSUCHCHANNEL).param(name).trailing_param(lines::NO_SUCH_CHANNEL);
            Err(())
        }
    }
}

/// Returns `Ok((id, client))` for the connected client whose nickname is
/// `nick`.  Otherwise sends a 401 reply and returns `Err(())`.
fn find_nick<'a>(
    id: ClientId,
    rb: &mut ReplyBuffer,
    clients: &'a Slab<Client>,
    nick: &str,
) -> Result<(ClientId, &'a Client), ()> {
    match clients.iter().find(|(_, client)| client.nick() == nick) {
        Some(found) => Ok(found),
        None => {
            log::debug!("{}:     no such nick {:?}", id, nick);
            rb.reply(rpl::ERR_NOSUCHNICK).param(nick).trailing_param(lines::NO_SUCH_NICK);
            Err(())
        }
    }
}

// Send utilities
impl StateInner {
    /// Sends the given message to the given client.
    fn send(&self, id: ClientId, msg: MessageQueueItem) {
        if let Some(client) = self.clients.get(id) {
            client.send(msg);
        }
    }

    /// Sends the given message to all members of the given channel.
    fn broadcast(&self, target: &str, msg: MessageQueueItem) {
        let channel = &self.channels[target];
        for &member in &channel.members {
            self.send(member, msg.clone());
        }
    }

    /// Sends the list of nicknames in the channel `channel_name` to the given
    /// client.
    fn write_names(&self, id: ClientId, rb: &mut ReplyBuffer, channel_name: &str) {
        if let Some(channel) = self.channels.get(channel_name) {
            let nick = self.clients[id].nick();
            let mut msg = rb.reply(rpl::NAMREPLY).param(nick).param("=").param(channel_name);
            let trailing = msg.raw_trailing_param();
            for &member in &channel.members {
                if channel.is_operator(member) {
                    trailing.push('@');
                }
                trailing.push_str(self.clients[member].nick());
                trailing.push(' ');
            }
            msg.build();
            rb.reply(rpl::ENDOFNAMES)
                .param(nick)
                .param(channel_name)
                .trailing_param(lines::END_OF_NAMES);
        }
    }
}
