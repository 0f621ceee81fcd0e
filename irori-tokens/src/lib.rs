//! Tokenize and build IRC messages.
//!
//! This library provides helpers to split incoming IRC lines into their
//! tokens, and to build well-formed, CR-LF terminated outgoing messages.

pub use buffers::{Buffer, MessageBuffer, ReplyBuffer};
pub use command::Command;
pub use message::{Message, MESSAGE_LENGTH, PARAMS_LENGTH};

mod buffers;
mod command;
mod message;
pub mod mode;
pub mod rpl;

/// Assert all data of a message.
///
/// Empty elements in `params` will not be asserted with their equivalent in
/// `msg.params`, but will still count for the assertion of the number of
/// parameters.
pub fn assert_msg(
    msg: &Message<'_>,
    prefix: Option<&str>,
    command: Result<Command, &str>,
    params: &[&str],
) {
    assert_eq!(msg.prefix, prefix, "prefix of {:?}", msg);
    assert_eq!(msg.command, command, "command of {:?}", msg);
    assert_eq!(msg.num_params, params.len(), "number of parameters of {:?}", msg);
    for (i, (actual, expected)) in msg.params.iter().zip(params.iter()).enumerate() {
        if expected.is_empty() {
            // Some parameters are different every time they are generated;
            // these are skipped.
            continue;
        }
        assert_eq!(actual, expected, "parameter #{} of {:?}", i, msg);
    }
}
