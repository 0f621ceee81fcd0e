use crate::client::ClientId;
use irori_tokens::{mode, MessageBuffer};
use irori_tokens::rpl::{self, Reply};
use std::collections::HashSet;

/// Channel data.
///
/// Members are stored by client id, in join order; the order is visible in
/// NAMES replies.  Operators and invited clients are subsets of the member
/// resp. client sets, also by id.
#[derive(Default)]
pub struct Channel {
    pub members: Vec<ClientId>,
    pub operators: HashSet<ClientId>,
    pub invited: HashSet<ClientId>,

    /// The topic.  Empty means unset.
    pub topic: String,

    /// The key.  Empty means the channel is not keyed.
    pub key: String,

    pub invite_only: bool,
    pub topic_restricted: bool,

    /// Member cap.  Zero means no cap.
    pub user_limit: usize,
}

impl Channel {
    /// Creates a channel with the given modes set.
    pub fn new(modes: &str) -> Channel {
        let mut channel = Channel::default();
        for change in mode::ChannelQuery::simple(modes).filter_map(Result::ok) {
            let _ = channel.apply_mode_change(change, |_| "");
        }
        channel
    }

    /// Adds a member.  The first member of a channel becomes its operator.
    pub fn add_member(&mut self, id: ClientId) {
        if self.members.contains(&id) {
            return;
        }
        if self.members.is_empty() {
            self.operators.insert(id);
        }
        self.members.push(id);
    }

    /// Removes a member, along with its operator and invited bits.
    pub fn remove_member(&mut self, id: ClientId) {
        self.members.retain(|&member| member != id);
        self.operators.remove(&id);
        self.invited.remove(&id);
    }

    pub fn is_member(&self, id: ClientId) -> bool {
        self.members.contains(&id)
    }

    pub fn is_operator(&self, id: ClientId) -> bool {
        self.operators.contains(&id)
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.user_limit != 0 && self.user_limit <= self.members.len()
    }

    /// Writes the active flag letters, for a 324 reply.
    pub fn write_modes(&self, mut out: MessageBuffer<'_>) {
        let modes = out.raw_param();
        modes.push('+');
        if self.invite_only {
            modes.push('i');
        }
        if self.topic_restricted {
            modes.push('t');
        }
        if self.has_key() {
            modes.push('k');
        }
        if self.user_limit != 0 {
            modes.push('l');
        }
        out.build();
    }

    /// Applies one mode change.  `nick_of` resolves member nicknames for the
    /// `o` flag.
    ///
    /// Returns whether the change is to be advertised to the channel; a
    /// `+l` with an unparsable argument is not.
    pub fn apply_mode_change<'a, F>(
        &mut self,
        change: mode::ChannelModeChange<'_>,
        nick_of: F,
    ) -> Result<bool, Reply>
    where
        F: Fn(ClientId) -> &'a str,
    {
        use mode::ChannelModeChange::*;
        match change {
            InviteOnly(value) => {
                self.invite_only = value;
            }
            TopicRestricted(value) => {
                self.topic_restricted = value;
            }
            SetKey(key) => {
                self.key = key.to_owned();
            }
            ClearKey => {
                self.key.clear();
            }
            SetUserLimit(s) => match s.parse() {
                Ok(limit) => {
                    self.user_limit = limit;
                }
                Err(_) => return Ok(false),
            },
            ClearUserLimit => {
                self.user_limit = 0;
            }
            Operator(value, nick) => {
                let member = self
                    .members
                    .iter()
                    .copied()
                    .find(|&member| nick_of(member) == nick);
                match member {
                    Some(member) if value => {
                        self.operators.insert(member);
                    }
                    Some(member) => {
                        self.operators.remove(&member);
                    }
                    None => return Err(rpl::ERR_USERNOTINCHANNEL),
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irori_tokens::ReplyBuffer;

    fn flags(channel: &Channel) -> String {
        let mut rb = ReplyBuffer::new("server");
        channel.write_modes(rb.reply(rpl::CHANNELMODEIS).param("nick").param("#chan"));
        let line = rb.build();
        line.trim_end().rsplit(' ').next().unwrap().to_owned()
    }

    #[test]
    fn test_new_applies_default_modes() {
        let channel = Channel::new("+t");
        assert!(channel.topic_restricted);
        assert!(!channel.invite_only);
        assert_eq!(channel.user_limit, 0);
        assert!(!channel.has_key());
    }

    #[test]
    fn test_first_member_becomes_operator() {
        let mut channel = Channel::new("+t");
        channel.add_member(1);
        channel.add_member(2);
        assert_eq!(channel.members, [1, 2]);
        assert!(channel.is_operator(1));
        assert!(!channel.is_operator(2));
    }

    #[test]
    fn test_members_are_not_duplicated() {
        let mut channel = Channel::new("");
        channel.add_member(1);
        channel.add_member(1);
        assert_eq!(channel.members, [1]);
    }

    #[test]
    fn test_remove_member_clears_all_bits() {
        let mut channel = Channel::new("");
        channel.add_member(1);
        channel.invited.insert(1);
        channel.remove_member(1);
        assert!(channel.members.is_empty());
        assert!(channel.operators.is_empty());
        assert!(channel.invited.is_empty());
    }

    #[test]
    fn test_mode_changes_are_reversible() {
        use mode::ChannelModeChange::*;
        let mut channel = Channel::new("+t");
        let nick_of = |_| "";

        let initial = channel.invite_only;
        channel.apply_mode_change(InviteOnly(true), nick_of).unwrap();
        channel.apply_mode_change(InviteOnly(false), nick_of).unwrap();
        assert_eq!(channel.invite_only, initial);

        channel.apply_mode_change(SetKey("secret"), nick_of).unwrap();
        assert_eq!(channel.key, "secret");
        channel.apply_mode_change(ClearKey, nick_of).unwrap();
        assert!(!channel.has_key());

        channel.apply_mode_change(SetUserLimit("3"), nick_of).unwrap();
        assert_eq!(channel.user_limit, 3);
        channel.apply_mode_change(ClearUserLimit, nick_of).unwrap();
        assert_eq!(channel.user_limit, 0);
    }

    #[test]
    fn test_operator_change_resolves_nicks() {
        use mode::ChannelModeChange::*;
        let mut channel = Channel::new("");
        channel.add_member(7);
        channel.add_member(8);
        let nick_of = |id: ClientId| if id == 8 { "bob" } else { "alice" };

        assert_eq!(channel.apply_mode_change(Operator(true, "bob"), nick_of), Ok(true));
        assert!(channel.is_operator(8));
        assert_eq!(channel.apply_mode_change(Operator(false, "bob"), nick_of), Ok(true));
        assert!(!channel.is_operator(8));
        assert_eq!(
            channel.apply_mode_change(Operator(true, "carol"), nick_of),
            Err(rpl::ERR_USERNOTINCHANNEL)
        );
    }

    #[test]
    fn test_unparsable_limit_is_not_advertised() {
        let channel_limit = Channel::new("").user_limit;
        let mut channel = Channel::new("");
        assert_eq!(channel.apply_mode_change(mode::ChannelModeChange::SetUserLimit("many"), |_| ""), Ok(false));
        assert_eq!(channel.user_limit, channel_limit);
    }

    #[test]
    fn test_write_modes() {
        let mut channel = Channel::new("+t");
        assert_eq!(flags(&channel), "+t");
        channel.invite_only = true;
        channel.key = "secret".to_owned();
        channel.user_limit = 3;
        assert_eq!(flags(&channel), "+itkl");
    }

    #[test]
    fn test_is_full() {
        let mut channel = Channel::new("");
        channel.add_member(1);
        assert!(!channel.is_full(), "no cap by default");
        channel.user_limit = 2;
        assert!(!channel.is_full());
        channel.add_member(2);
        assert!(channel.is_full());
    }
}
