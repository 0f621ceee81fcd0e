//! Numeric replies.

/// The type of a numeric reply code.
///
/// Replies are used as the command part of server-originated messages, e.g.
/// `:server 433 nick :Nickname is already in use`.
pub type Reply = &'static str;

pub const WELCOME: Reply = "001";

pub const CHANNELMODEIS: Reply = "324";
pub const NOTOPIC: Reply = "331";
pub const TOPIC: Reply = "332";
pub const INVITING: Reply = "341";
pub const NAMREPLY: Reply = "353";
pub const ENDOFNAMES: Reply = "366";

pub const ERR_NOSUCHNICK: Reply = "401";
pub const ERR_NOSUCHCHANNEL: Reply = "403";
pub const ERR_CANNOTSENDTOCHAN: Reply = "404";
pub const ERR_UNKNOWNCOMMAND: Reply = "421";
pub const ERR_NONICKNAMEGIVEN: Reply = "431";
pub const ERR_NICKNAMEINUSE: Reply = "433";
pub const ERR_USERNOTINCHANNEL: Reply = "441";
pub const ERR_NOTONCHANNEL: Reply = "442";
pub const ERR_USERONCHANNEL: Reply = "443";
pub const ERR_NOTREGISTERED: Reply = "451";
pub const ERR_NEEDMOREPARAMS: Reply = "461";
pub const ERR_PASSWDMISMATCH: Reply = "464";
pub const ERR_CHANNELISFULL: Reply = "471";
pub const ERR_INVITEONLYCHAN: Reply = "473";
pub const ERR_BADCHANNELKEY: Reply = "475";
pub const ERR_CHANOPRIVSNEEDED: Reply = "482";
