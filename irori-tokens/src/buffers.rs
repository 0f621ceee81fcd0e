use crate::Command;
use crate::rpl::Reply;

/// Builder of one IRC message inside a `Buffer` or a `ReplyBuffer`.
///
/// Parameters are appended in call order; the terminating CR-LF is written
/// when the builder is dropped, so the message is complete once the builder
/// goes out of scope (or `build` is called).
pub struct MessageBuffer<'a> {
    buf: &'a mut String,
}

impl<'a> MessageBuffer<'a> {
    fn new(buf: &'a mut String, prefix: &str, command: &str) -> MessageBuffer<'a> {
        if !prefix.is_empty() {
            buf.push(':');
            buf.push_str(prefix);
            buf.push(' ');
        }
        buf.push_str(command);
        MessageBuffer { buf }
    }

    /// Appends a middle parameter.  Empty parameters are skipped.
    pub fn param(self, param: impl AsRef<str>) -> MessageBuffer<'a> {
        let param = param.as_ref();
        if !param.is_empty() {
            self.buf.push(' ');
            self.buf.push_str(param);
        }
        self
    }

    /// Appends the trailing parameter and ends the message.
    ///
    /// The parameter may be empty and may contain spaces.
    pub fn trailing_param(self, param: impl AsRef<str>) {
        self.buf.push_str(" :");
        self.buf.push_str(param.as_ref());
    }

    /// Starts a middle parameter and returns the underlying buffer, for
    /// incremental building.  No method of the builder may be called while
    /// the parameter is being written.
    pub fn raw_param(&mut self) -> &mut String {
        self.buf.push(' ');
        self.buf
    }

    /// Starts the trailing parameter and returns the underlying buffer.
    pub fn raw_trailing_param(&mut self) -> &mut String {
        self.buf.push_str(" :");
        self.buf
    }

    /// Ends the message.  Dropping the builder does the same.
    pub fn build(self) {}
}

impl Drop for MessageBuffer<'_> {
    fn drop(&mut self) {
        self.buf.push_str("\r\n");
    }
}

/// Builder of freely prefixed messages, e.g. `:nick!user@host KICK #chan nick`.
#[derive(Debug, Default)]
pub struct Buffer {
    buf: String,
}

impl Buffer {
    pub fn new() -> Buffer {
        Buffer::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Starts a message with the given prefix.  An empty prefix writes none.
    pub fn message(&mut self, prefix: &str, command: Command) -> MessageBuffer<'_> {
        MessageBuffer::new(&mut self.buf, prefix, command.as_str())
    }

    /// The accumulated messages.
    pub fn build(self) -> String {
        self.buf
    }
}

/// Builder of server-originated messages: numeric replies carry the server
/// prefix, e.g. `:server 001 nick :Welcome...`.
#[derive(Debug)]
pub struct ReplyBuffer {
    domain: String,
    buf: String,
}

impl ReplyBuffer {
    pub fn new(domain: &str) -> ReplyBuffer {
        ReplyBuffer {
            domain: domain.to_owned(),
            buf: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Starts a numeric reply.
    pub fn reply(&mut self, r: Reply) -> MessageBuffer<'_> {
        MessageBuffer::new(&mut self.buf, &self.domain, r)
    }

    /// Starts a non-numeric message, like `Buffer::message`.
    pub fn message(&mut self, prefix: &str, command: Command) -> MessageBuffer<'_> {
        MessageBuffer::new(&mut self.buf, prefix, command.as_str())
    }

    /// The accumulated messages.
    pub fn build(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpl;

    #[test]
    fn test_reply_with_params_and_trailing() {
        let mut rb = ReplyBuffer::new("server");
        rb.reply(rpl::ERR_NICKNAMEINUSE)
            .param("alice")
            .trailing_param("Nickname is already in use");
        assert_eq!(rb.build(), ":server 433 alice :Nickname is already in use\r\n");
    }

    #[test]
    fn test_reply_without_params() {
        let mut rb = ReplyBuffer::new("server");
        rb.reply(rpl::ERR_PASSWDMISMATCH).trailing_param("Password incorrect");
        assert_eq!(rb.build(), ":server 464 :Password incorrect\r\n");
    }

    #[test]
    fn test_several_messages() {
        let mut rb = ReplyBuffer::new("server");
        rb.reply(rpl::NOTOPIC).param("alice").param("#chan").trailing_param("No topic is set");
        rb.reply(rpl::ENDOFNAMES).param("alice").param("#chan").trailing_param("End of NAMES list");
        assert_eq!(
            rb.build(),
            ":server 331 alice #chan :No topic is set\r\n\
             :server 366 alice #chan :End of NAMES list\r\n"
        );
    }

    #[test]
    fn test_message_with_user_prefix() {
        let mut buf = Buffer::new();
        buf.message("alice!a@127.0.0.1", Command::Join).param("#chan");
        assert_eq!(buf.build(), ":alice!a@127.0.0.1 JOIN #chan\r\n");
    }

    #[test]
    fn test_message_without_prefix_and_raw_param() {
        let mut rb = ReplyBuffer::new("server");
        let mut msg = rb.message("", Command::Pong).param("server");
        msg.raw_param().push_str("token");
        msg.build();
        assert_eq!(rb.build(), "PONG server token\r\n");
    }

    #[test]
    fn test_raw_param_keeps_separator_for_empty_value() {
        let mut rb = ReplyBuffer::new("server");
        let mut msg = rb.message("", Command::Pong).param("server");
        msg.raw_param();
        msg.build();
        assert_eq!(rb.build(), "PONG server \r\n");
    }

    #[test]
    fn test_empty_params_are_skipped() {
        let mut rb = ReplyBuffer::new("server");
        rb.reply(rpl::ERR_UNKNOWNCOMMAND).param("").trailing_param("Unknown command");
        assert_eq!(rb.build(), ":server 421 :Unknown command\r\n");
    }

    #[test]
    fn test_raw_trailing_param() {
        let mut rb = ReplyBuffer::new("server");
        let mut msg = rb.reply(rpl::NAMREPLY).param("alice").param("=").param("#chan");
        let trailing = msg.raw_trailing_param();
        trailing.push_str("@alice ");
        msg.build();
        assert_eq!(rb.build(), ":server 353 alice = #chan :@alice \r\n");
    }

    #[test]
    fn test_empty_trailing_param_is_kept() {
        let mut buf = Buffer::new();
        buf.message("bob!b@::1", Command::Part).param("#chan").trailing_param("");
        assert_eq!(buf.build(), ":bob!b@::1 PART #chan :\r\n");
    }
}
