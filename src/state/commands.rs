//! Handlers for the supported verbs.
//!
//! Each handler takes the parameters of one well-formed message and either
//! mutates the state, or writes a numeric reply into the client's buffer and
//! returns `Err(())`.  Handlers never block.

use super::{find_channel, find_nick, CommandContext, HandlerResult, StateInner};
use crate::channel::Channel;
use crate::client::MessageQueueItem;
use crate::lines;
use irori_tokens::{mode, rpl, Buffer, Command};

impl StateInner {
    pub fn cmd_pass(&mut self, ctx: CommandContext<'_>, password: &str) -> HandlerResult {
        if password != self.password {
            log::debug!("{}: Bad password", ctx.id);
            ctx.rb.reply(rpl::ERR_PASSWDMISMATCH).trailing_param(lines::PASSWORD_INCORRECT);
            return Err(());
        }
        self.clients[ctx.id].set_pass_ok(true);
        Ok(())
    }

    pub fn cmd_nick(&mut self, ctx: CommandContext<'_>, nick: &str) -> HandlerResult {
        if self.clients.iter().any(|(_, client)| client.nick() == nick) {
            log::debug!("{}: NICK {:?} is already in use", ctx.id, nick);
            ctx.rb.reply(rpl::ERR_NICKNAMEINUSE).param(nick).trailing_param(lines::NICKNAME_IN_USE);
            return Err(());
        }
        let client = &mut self.clients[ctx.id];
        client.set_nickname(nick);
        if client.try_register() {
            lines::welcome(ctx.rb.reply(rpl::WELCOME).param(nick), nick);
        }
        Ok(())
    }

    pub fn cmd_user(&mut self, ctx: CommandContext<'_>, username: &str, realname: &str) -> HandlerResult {
        let client = &mut self.clients[ctx.id];
        client.set_username(username);
        client.set_realname(realname);
        if client.try_register() {
            let nick = client.nick().to_owned();
            lines::welcome(ctx.rb.reply(rpl::WELCOME).param(&nick), &nick);
        }
        Ok(())
    }

    pub fn cmd_join(&mut self, ctx: CommandContext<'_>, target: &str, key: &str) -> HandlerResult {
        let name = if target.starts_with('#') {
            target.to_owned()
        } else {
            format!("#{}", target)
        };

        if let Some(channel) = self.channels.get(&name) {
            // A keyed channel only rejects keys that were supplied and don't
            // match; joining with no key is not an error.
            if !key.is_empty() && channel.has_key() && channel.key != key {
                log::debug!("{}: JOIN {:?}: bad key", ctx.id, name);
                ctx.rb.reply(rpl::ERR_BADCHANNELKEY).param(&name).trailing_param(lines::BAD_CHANNEL_KEY);
                return Err(());
            }
            if channel.invite_only && !channel.invited.contains(&ctx.id) {
                log::debug!("{}: JOIN {:?}: not invited", ctx.id, name);
                ctx.rb.reply(rpl::ERR_INVITEONLYCHAN).param(&name).trailing_param(lines::INVITE_ONLY_CHAN);
                return Err(());
            }
            if channel.is_full() {
                log::debug!("{}: JOIN {:?}: channel is full", ctx.id, name);
                ctx.rb.reply(rpl::ERR_CHANNELISFULL).param(&name).trailing_param(lines::CHANNEL_IS_FULL);
                return Err(());
            }
        } else {
            log::debug!("{}: Creating channel {:?}", ctx.id, name);
        }

        let default_chan_mode = &self.default_chan_mode;
        let channel = self
            .channels
            .entry(name.clone())
            .or_insert_with(|| Channel::new(default_chan_mode));
        channel.add_member(ctx.id);

        let mut join = Buffer::new();
        join.message(&self.clients[ctx.id].full_name(), Command::Join).param(&name);
        self.broadcast(&name, MessageQueueItem::from(join));

        let channel = &self.channels[name.as_str()];
        if !channel.topic.is_empty() {
            ctx.rb
                .reply(rpl::TOPIC)
                .param(self.clients[ctx.id].nick())
                .param(&name)
                .trailing_param(&channel.topic);
        }
        self.write_names(ctx.id, ctx.rb, &name);
        Ok(())
    }

    pub fn cmd_privmsg(&mut self, ctx: CommandContext<'_>, target: &str, text: &str) -> HandlerResult {
        let mut buf = Buffer::new();
        buf.message(&self.clients[ctx.id].full_name(), Command::PrivMsg)
            .param(target)
            .trailing_param(text);
        let msg = MessageQueueItem::from(buf);

        if target.starts_with('#') {
            let channel = find_channel(ctx.id, ctx.rb, &self.channels, target)?;
            if !channel.is_member(ctx.id) {
                log::debug!("{}: PRIVMSG {:?}: not a member", ctx.id, target);
                ctx.rb
                    .reply(rpl::ERR_CANNOTSENDTOCHAN)
                    .param(target)
                    .trailing_param(lines::CANNOT_SEND_TO_CHAN);
                return Err(());
            }
            for &member in &channel.members {
                if member != ctx.id {
                    self.send(member, msg.clone());
                }
            }
        } else {
            let (_, client) = find_nick(ctx.id, ctx.rb, &self.clients, target)?;
            client.send(msg);
        }
        Ok(())
    }

    pub fn cmd_kick(
        &mut self,
        ctx: CommandContext<'_>,
        target: &str,
        nick: &str,
        reason: Option<&str>,
    ) -> HandlerResult {
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, target)?;
        if !channel.is_operator(ctx.id) {
            log::debug!("{}: KICK {:?}: not operator", ctx.id, target);
            ctx.rb
                .reply(rpl::ERR_CHANOPRIVSNEEDED)
                .param(target)
                .trailing_param(lines::CHANOP_PRIVS_NEEDED);
            return Err(());
        }
        let (kicked, _) = find_nick(ctx.id, ctx.rb, &self.clients, nick)?;
        if !channel.is_member(kicked) {
            log::debug!("{}: KICK {:?}: {:?} is not a member", ctx.id, target, nick);
            ctx.rb
                .reply(rpl::ERR_USERNOTINCHANNEL)
                .param(nick)
                .param(target)
                .trailing_param(lines::USER_NOT_IN_CHANNEL);
            return Err(());
        }

        let mut buf = Buffer::new();
        buf.message(&self.clients[ctx.id].full_name(), Command::Kick)
            .param(target)
            .param(nick)
            .trailing_param(reason.unwrap_or(lines::DEFAULT_KICK_REASON));
        self.broadcast(target, MessageQueueItem::from(buf));

        let now_empty = match self.channels.get_mut(target) {
            Some(channel) => {
                channel.remove_member(kicked);
                channel.members.is_empty()
            }
            None => false,
        };
        if now_empty {
            log::debug!("Removing channel {:?}", target);
            self.channels.remove(target);
        }
        Ok(())
    }

    pub fn cmd_part(&mut self, ctx: CommandContext<'_>, target: &str, reason: Option<&str>) -> HandlerResult {
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, target)?;
        if !channel.is_member(ctx.id) {
            log::debug!("{}: PART {:?}: not a member", ctx.id, target);
            ctx.rb
                .reply(rpl::ERR_NOTONCHANNEL)
                .param(target)
                .trailing_param(lines::NOT_ON_CHANNEL);
            return Err(());
        }

        let mut buf = Buffer::new();
        buf.message(&self.clients[ctx.id].full_name(), Command::Part)
            .param(target)
            .trailing_param(reason.unwrap_or(lines::DEFAULT_PART_REASON));
        self.broadcast(target, MessageQueueItem::from(buf));

        let now_empty = match self.channels.get_mut(target) {
            Some(channel) => {
                channel.remove_member(ctx.id);
                channel.members.is_empty()
            }
            None => false,
        };
        if now_empty {
            log::debug!("Removing channel {:?}", target);
            self.channels.remove(target);
        }
        Ok(())
    }

    pub fn cmd_topic(&mut self, ctx: CommandContext<'_>, target: &str, topic: Option<&str>) -> HandlerResult {
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, target)?;
        if !channel.is_member(ctx.id) {
            log::debug!("{}: TOPIC {:?}: not a member", ctx.id, target);
            ctx.rb
                .reply(rpl::ERR_NOTONCHANNEL)
                .param(target)
                .trailing_param(lines::NOT_ON_CHANNEL);
            return Err(());
        }
        match topic {
            None => {
                let nick = self.clients[ctx.id].nick();
                if channel.topic.is_empty() {
                    ctx.rb.reply(rpl::NOTOPIC).param(nick).param(target).trailing_param(lines::NO_TOPIC);
                } else {
                    ctx.rb.reply(rpl::TOPIC).param(nick).param(target).trailing_param(&channel.topic);
                }
            }
            Some(topic) => {
                if channel.topic_restricted && !channel.is_operator(ctx.id) {
                    log::debug!("{}: TOPIC {:?}: not operator", ctx.id, target);
                    ctx.rb
                        .reply(rpl::ERR_CHANOPRIVSNEEDED)
                        .param(target)
                        .trailing_param(lines::CHANOP_PRIVS_NEEDED);
                    return Err(());
                }
                if let Some(channel) = self.channels.get_mut(target) {
                    channel.topic = topic.to_owned();
                }
                let mut buf = Buffer::new();
                buf.message(&self.clients[ctx.id].full_name(), Command::Topic)
                    .param(target)
                    .trailing_param(topic);
                self.broadcast(target, MessageQueueItem::from(buf));
            }
        }
        Ok(())
    }

    pub fn cmd_mode(
        &mut self,
        ctx: CommandContext<'_>,
        target: &str,
        modes: &str,
        params: &[&str],
    ) -> HandlerResult {
        // User modes are not supported; they are dropped on the floor rather
        // than answered with an error.
        if !target.starts_with('#') {
            log::debug!("{}: MODE {:?}: not a channel, ignoring", ctx.id, target);
            return Ok(());
        }

        if modes.is_empty() {
            let channel = find_channel(ctx.id, ctx.rb, &self.channels, target)?;
            let msg = ctx.rb.reply(rpl::CHANNELMODEIS).param(self.clients[ctx.id].nick()).param(target);
            channel.write_modes(msg);
            return Ok(());
        }

        let channel = match self.channels.get_mut(target) {
            Some(channel) => channel,
            None => {
                log::debug!("{}:     no such channel {:?}", ctx.id, target);
                ctx.rb.reply(rpl::ERR_NOSUCHCHANNEL).param(target).trailing_param(lines::NO_SUCH_CHANNEL);
                return Err(());
            }
        };
        if !channel.is_operator(ctx.id) {
            log::debug!("{}: MODE {:?}: not operator", ctx.id, target);
            ctx.rb
                .reply(rpl::ERR_CHANOPRIVSNEEDED)
                .param(target)
                .trailing_param(lines::CHANOP_PRIVS_NEEDED);
            return Err(());
        }

        let clients = &self.clients;
        let prefix = clients[ctx.id].full_name();
        for change in mode::ChannelQuery::new(modes, params.iter().copied()) {
            // Unknown letters and letters missing their argument are skipped.
            let change = match change {
                Ok(change) => change,
                Err(_) => continue,
            };
            match channel.apply_mode_change(change, |member| clients[member].nick()) {
                Ok(true) => {
                    let mut buf = Buffer::new();
                    {
                        let mut msg = buf.message(&prefix, Command::Mode).param(target);
                        let flag = msg.raw_param();
                        flag.push(if change.value() { '+' } else { '-' });
                        flag.push(change.symbol());
                        if let Some(param) = change.param() {
                            msg.param(param);
                        }
                    }
                    let item = MessageQueueItem::from(buf);
                    for &member in &channel.members {
                        if let Some(client) = clients.get(member) {
                            client.send(item.clone());
                        }
                    }
                }
                Ok(false) => {}
                Err(reply) => {
                    ctx.rb
                        .reply(reply)
                        .param(change.param().unwrap_or(""))
                        .param(target)
                        .trailing_param(lines::USER_NOT_IN_CHANNEL);
                }
            }
        }
        Ok(())
    }

    pub fn cmd_invite(&mut self, ctx: CommandContext<'_>, nick: &str, target: &str) -> HandlerResult {
        let (invited, _) = find_nick(ctx.id, ctx.rb, &self.clients, nick)?;
        let channel = find_channel(ctx.id, ctx.rb, &self.channels, target)?;
        if !channel.is_member(ctx.id) {
            log::debug!("{}: INVITE {:?}: not a member", ctx.id, target);
            ctx.rb
                .reply(rpl::ERR_NOTONCHANNEL)
                .param(target)
                .trailing_param(lines::NOT_ON_CHANNEL);
            return Err(());
        }
        if channel.invite_only && !channel.is_operator(ctx.id) {
            log::debug!("{}: INVITE {:?}: not operator", ctx.id, target);
            ctx.rb
                .reply(rpl::ERR_CHANOPRIVSNEEDED)
                .param(target)
                .trailing_param(lines::CHANOP_PRIVS_NEEDED);
            return Err(());
        }
        if channel.is_member(invited) {
            log::debug!("{}: INVITE {:?}: {:?} is already a member", ctx.id, target, nick);
            ctx.rb
                .reply(rpl::ERR_USERONCHANNEL)
                .param(nick)
                .param(target)
                .trailing_param(lines::USER_ON_CHANNEL);
            return Err(());
        }

        if let Some(channel) = self.channels.get_mut(target) {
            channel.invited.insert(invited);
        }

        let inviter = &self.clients[ctx.id];
        ctx.rb.reply(rpl::INVITING).param(inviter.nick()).param(nick).param(target);
        let mut buf = Buffer::new();
        buf.message(&inviter.full_name(), Command::Invite).param(nick).trailing_param(target);
        self.send(invited, MessageQueueItem::from(buf));
        Ok(())
    }

    pub fn cmd_quit(&mut self, ctx: CommandContext<'_>, reason: Option<&str>) -> HandlerResult {
        log::debug!("{}: QUIT", ctx.id);
        let mut buf = Buffer::new();
        buf.message(&self.clients[ctx.id].full_name(), Command::Quit)
            .trailing_param(reason.unwrap_or(lines::DEFAULT_QUIT_REASON));
        let msg = MessageQueueItem::from(buf);

        for channel in self.channels.values() {
            if channel.is_member(ctx.id) {
                for &member in &channel.members {
                    if member != ctx.id {
                        self.send(member, msg.clone());
                    }
                }
            }
        }

        self.channels.retain(|_, channel| {
            channel.remove_member(ctx.id);
            !channel.members.is_empty()
        });
        self.clients.remove(ctx.id);
        Ok(())
    }

    pub fn cmd_ping(&mut self, ctx: CommandContext<'_>, token: &str) -> HandlerResult {
        let mut msg = ctx.rb.message("", Command::Pong).param(&self.domain);
        msg.raw_param().push_str(token);
        msg.build();
        Ok(())
    }
}
