use crate::Command;

/// The maximum length of a message, terminator included.
pub const MESSAGE_LENGTH: usize = 512;

/// The maximum number of parameters a message can carry.
pub const PARAMS_LENGTH: usize = 15;

/// Splits off the first word of `s` and returns the rest, leading spaces
/// included.
fn next_word(s: &str) -> (&str, &str) {
    match s.find(' ') {
        Some(i) => (&s[..i], &s[i..]),
        None => (s, ""),
    }
}

/// A message from a peer, split into its tokens.
///
/// Tokens borrow from the source line; a `Message` is not meant to outlive the
/// buffer it was parsed from.
#[derive(Debug)]
pub struct Message<'a> {
    /// The prefix, colon stripped.
    pub prefix: Option<&'a str>,

    /// The verb, or the raw token when it maps to no known verb.
    pub command: Result<Command, &'a str>,

    /// The number of slots of `params` that are filled.
    pub num_params: usize,

    /// The parameters.  Unfilled slots are empty strings.
    pub params: [&'a str; PARAMS_LENGTH],
}

impl<'a> Message<'a> {
    /// Parses one line, without its terminator (any trailing CR/LF bytes are
    /// ignored).  Returns `None` when the line is empty.
    ///
    /// Empty tokens between spaces are dropped, so any run of spaces counts as
    /// one separator.  This is laxer than RFC 1459, which allows exactly one
    /// space between tokens.  Trailing parameters (`:`-introduced) are kept
    /// byte-verbatim, spaces included.
    pub fn parse(s: &'a str) -> Option<Message<'a>> {
        let mut rest = s.trim_end_matches(|c| c == '\r' || c == '\n');
        if rest.is_empty() {
            return None;
        }

        let mut prefix = None;
        if rest.starts_with(':') {
            let (word, tail) = next_word(&rest[1..]);
            prefix = Some(word);
            rest = tail;
        }

        let (verb, tail) = next_word(rest.trim_start_matches(' '));
        let command = Command::parse(verb).ok_or(verb);
        rest = tail;

        let mut params = [""; PARAMS_LENGTH];
        let mut num_params = 0;
        while num_params < PARAMS_LENGTH {
            let tail = rest.trim_start_matches(' ');
            if tail.is_empty() {
                break;
            }
            if tail.starts_with(':') {
                params[num_params] = &tail[1..];
                num_params += 1;
                break;
            }
            let (word, tail) = next_word(tail);
            params[num_params] = word;
            num_params += 1;
            rest = tail;
        }

        Some(Message {
            prefix,
            command,
            num_params,
            params,
        })
    }

    /// Whether the message has enough parameters for its verb.
    pub fn has_enough_params(&self) -> bool {
        match self.command {
            Ok(command) => command.required_params() <= self.num_params,
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let msg = Message::parse("NICK alice\r\n").unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, Ok(Command::Nick));
        assert_eq!(msg.num_params, 1);
        assert_eq!(msg.params[0], "alice");
    }

    #[test]
    fn test_parse_prefix_and_trailing() {
        let msg = Message::parse(":alice!a@127.0.0.1 PRIVMSG #chan :hello  world").unwrap();
        crate::assert_msg(
            &msg,
            Some("alice!a@127.0.0.1"),
            Ok(Command::PrivMsg),
            &["#chan", "hello  world"],
        );
    }

    #[test]
    fn test_parse_drops_empty_tokens() {
        let msg = Message::parse("MODE   #chan  +k   secret").unwrap();
        assert_eq!(msg.num_params, 3);
        assert_eq!(&msg.params[..3], &["#chan", "+k", "secret"]);
    }

    #[test]
    fn test_parse_keeps_trailing_verbatim() {
        let msg = Message::parse(":server 353 alice = #x :@alice ").unwrap();
        assert_eq!(msg.command, Ok(Command::Reply(353)));
        assert_eq!(msg.num_params, 4);
        assert_eq!(msg.params[3], "@alice ");
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg = Message::parse("PART #chan :").unwrap();
        assert_eq!(msg.num_params, 2);
        assert_eq!(msg.params[1], "");
    }

    #[test]
    fn test_parse_verb_case_insensitive() {
        let msg = Message::parse("join #chan").unwrap();
        assert_eq!(msg.command, Ok(Command::Join));
    }

    #[test]
    fn test_parse_unknown_verb() {
        let msg = Message::parse("WHOIS alice").unwrap();
        assert_eq!(msg.command, Err("WHOIS"));
        assert_eq!(msg.num_params, 1);
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(Message::parse("").is_none());
        assert!(Message::parse("\r\n").is_none());
    }

    #[test]
    fn test_parse_blank_line_has_empty_verb() {
        let msg = Message::parse("   ").unwrap();
        assert_eq!(msg.command, Err(""));
        assert_eq!(msg.num_params, 0);
    }

    #[test]
    fn test_has_enough_params() {
        assert!(Message::parse("USER a 0 * :A").unwrap().has_enough_params());
        assert!(!Message::parse("USER a").unwrap().has_enough_params());
        assert!(Message::parse("QUIT").unwrap().has_enough_params());
        assert!(!Message::parse("PRIVMSG #chan").unwrap().has_enough_params());
    }
}
