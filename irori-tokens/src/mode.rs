//! Mode string parsing.
//!
//! Channel mode strings are read left to right, with a sign toggle that
//! starts positive: `"+k-i"` and `"k-i"` mean the same thing.  Letters that
//! take an argument consume from a separate parameter iterator.

use std::iter;

/// Iterator over the letters of a mode string, with their current sign.
struct SimpleQuery<'a> {
    modes: &'a [u8],
    value: bool,
}

impl<'a> Iterator for SimpleQuery<'a> {
    type Item = (bool, u8);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.modes.is_empty() {
                return None;
            }
            match self.modes[0] {
                b'+' => {
                    self.value = true;
                }
                b'-' => {
                    self.value = false;
                }
                c => {
                    self.modes = &self.modes[1..];
                    return Some((self.value, c));
                }
            }
            self.modes = &self.modes[1..];
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    UnknownMode(char),
    MissingModeParam,
}

pub type Result<T> = std::result::Result<T, Error>;

/// One requested change to the modes of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelModeChange<'a> {
    InviteOnly(bool),
    TopicRestricted(bool),
    SetKey(&'a str),
    ClearKey,
    SetUserLimit(&'a str),
    ClearUserLimit,
    Operator(bool, &'a str),
}

impl ChannelModeChange<'_> {
    /// The sign of the change.
    pub fn value(&self) -> bool {
        use ChannelModeChange::*;
        match self {
            InviteOnly(v) | TopicRestricted(v) | Operator(v, _) => *v,
            SetKey(_) | SetUserLimit(_) => true,
            ClearKey | ClearUserLimit => false,
        }
    }

    /// The mode letter of the change.
    pub fn symbol(&self) -> char {
        use ChannelModeChange::*;
        match self {
            InviteOnly(_) => 'i',
            TopicRestricted(_) => 't',
            SetKey(_) | ClearKey => 'k',
            SetUserLimit(_) | ClearUserLimit => 'l',
            Operator(_, _) => 'o',
        }
    }

    /// The argument of the change, if any.
    pub fn param(&self) -> Option<&str> {
        use ChannelModeChange::*;
        match self {
            SetKey(p) | SetUserLimit(p) | Operator(_, p) => Some(p),
            _ => None,
        }
    }
}

/// Iterator over the changes of a channel mode string.
pub struct ChannelQuery<'a, I> {
    inner: SimpleQuery<'a>,
    params: I,
}

impl<'a, I> ChannelQuery<'a, I> {
    pub fn new(modes: &'a str, params: I) -> ChannelQuery<'a, I> {
        ChannelQuery {
            inner: SimpleQuery {
                modes: modes.as_bytes(),
                value: true,
            },
            params,
        }
    }
}

impl<'a> ChannelQuery<'a, iter::Empty<&'a str>> {
    /// Iterator over a mode string with no arguments, e.g. a default channel
    /// mode from the configuration.
    pub fn simple(modes: &'a str) -> ChannelQuery<'a, iter::Empty<&'a str>> {
        ChannelQuery::new(modes, iter::empty())
    }
}

impl<'a, I> Iterator for ChannelQuery<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    type Item = Result<ChannelModeChange<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let (value, mode) = self.inner.next()?;
        Some(match mode {
            b'i' => Ok(ChannelModeChange::InviteOnly(value)),
            b't' => Ok(ChannelModeChange::TopicRestricted(value)),
            b'k' => {
                if value {
                    self.params
                        .next()
                        .map(ChannelModeChange::SetKey)
                        .ok_or(Error::MissingModeParam)
                } else {
                    Ok(ChannelModeChange::ClearKey)
                }
            }
            b'l' => {
                if value {
                    self.params
                        .next()
                        .map(ChannelModeChange::SetUserLimit)
                        .ok_or(Error::MissingModeParam)
                } else {
                    Ok(ChannelModeChange::ClearUserLimit)
                }
            }
            b'o' => self
                .params
                .next()
                .map(|param| ChannelModeChange::Operator(value, param))
                .ok_or(Error::MissingModeParam),
            other => Err(Error::UnknownMode(other as char)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query<'a>(modes: &'a str, params: &'a [&'a str]) -> Vec<Result<ChannelModeChange<'a>>> {
        ChannelQuery::new(modes, params.iter().copied()).collect()
    }

    #[test]
    fn test_default_sign_is_positive() {
        assert_eq!(query("i", &[]), vec![Ok(ChannelModeChange::InviteOnly(true))]);
    }

    #[test]
    fn test_sign_toggles() {
        assert_eq!(
            query("+i-t+t", &[]),
            vec![
                Ok(ChannelModeChange::InviteOnly(true)),
                Ok(ChannelModeChange::TopicRestricted(false)),
                Ok(ChannelModeChange::TopicRestricted(true)),
            ]
        );
    }

    #[test]
    fn test_params_are_consumed_in_order() {
        assert_eq!(
            query("+klo", &["secret", "3", "alice"]),
            vec![
                Ok(ChannelModeChange::SetKey("secret")),
                Ok(ChannelModeChange::SetUserLimit("3")),
                Ok(ChannelModeChange::Operator(true, "alice")),
            ]
        );
    }

    #[test]
    fn test_clearing_consumes_no_param() {
        assert_eq!(
            query("-kl+o", &["alice"]),
            vec![
                Ok(ChannelModeChange::ClearKey),
                Ok(ChannelModeChange::ClearUserLimit),
                Ok(ChannelModeChange::Operator(true, "alice")),
            ]
        );
    }

    #[test]
    fn test_removing_an_operator_consumes_a_param() {
        assert_eq!(
            query("-o", &["alice"]),
            vec![Ok(ChannelModeChange::Operator(false, "alice"))]
        );
    }

    #[test]
    fn test_missing_params_are_reported() {
        assert_eq!(
            query("+kk", &["secret"]),
            vec![
                Ok(ChannelModeChange::SetKey("secret")),
                Err(Error::MissingModeParam),
            ]
        );
    }

    #[test]
    fn test_unknown_modes_are_reported() {
        assert_eq!(
            query("+is", &[]),
            vec![
                Ok(ChannelModeChange::InviteOnly(true)),
                Err(Error::UnknownMode('s')),
            ]
        );
    }
}
