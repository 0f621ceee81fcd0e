//! Reply lines.
//!
//! This module contains the text of the replies irori sends, so that handlers
//! don't have to carry string literals around.

use irori_tokens::MessageBuffer;

pub const BAD_CHANNEL_KEY: &str = "Cannot join channel (+k) - wrong key";
pub const CANNOT_SEND_TO_CHAN: &str = "Cannot send to channel";
pub const CHANNEL_IS_FULL: &str = "Cannot join channel (+l) - channel is full";
pub const CHANOP_PRIVS_NEEDED: &str = "You're not channel operator";
pub const END_OF_NAMES: &str = "End of NAMES list";
pub const INVITE_ONLY_CHAN: &str = "Cannot join channel (+i) - you must be invited";
pub const NEED_MORE_PARAMS: &str = "Not enough parameters";
pub const NICKNAME_IN_USE: &str = "Nickname is already in use";
pub const NO_NICKNAME_GIVEN: &str = "No nickname given";
pub const NO_SUCH_CHANNEL: &str = "No such channel";
pub const NO_SUCH_NICK: &str = "No such nick/channel";
pub const NO_TOPIC: &str = "No topic is set";
pub const NOT_ON_CHANNEL: &str = "You're not on that channel";
pub const NOT_REGISTERED: &str = "You have not registered";
pub const PASSWORD_INCORRECT: &str = "Password incorrect";
pub const UNKNOWN_COMMAND: &str = "Unknown command";
pub const USER_NOT_IN_CHANNEL: &str = "They aren't on that channel";
pub const USER_ON_CHANNEL: &str = "is already on channel";

pub const DEFAULT_KICK_REASON: &str = "No reason given";
pub const DEFAULT_PART_REASON: &str = "Leaving";
pub const DEFAULT_QUIT_REASON: &str = "Quit";

/// Writes the 001 welcome line for `nick`.
pub fn welcome(mut msg: MessageBuffer<'_>, nick: &str) {
    let trailing = msg.raw_trailing_param();
    trailing.push_str("Welcome to the IRC server ");
    trailing.push_str(nick);
    trailing.push('!');
}
