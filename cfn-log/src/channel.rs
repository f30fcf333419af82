//! Logical log channels.
//!
//! A channel is a logger identity, independent of where its records end up.
//! The set is fixed: downstream tools only ever log through one of these.
//! Channels do not propagate: a record reaches its own channel's handler
//! and nothing else.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::LogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogChannel {
    /// General records and anything whose target matches no other channel.
    Root,
    /// cfn-init
    Init,
    /// CloudFormation API client
    Client,
    /// cfn-hup daemon
    Hup,
    /// Wire-protocol trace (requests and responses)
    Wire,
    /// Output of commands run by cfn-init
    Cmd,
}

impl LogChannel {
    pub const ALL: [LogChannel; 6] = [
        LogChannel::Root,
        LogChannel::Init,
        LogChannel::Client,
        LogChannel::Hup,
        LogChannel::Wire,
        LogChannel::Cmd,
    ];

    /// Logger name used as the `log` target. The root channel has an empty name.
    pub fn qualified_name(self) -> &'static str {
        match self {
            LogChannel::Root => "",
            LogChannel::Init => "cfn.init",
            LogChannel::Client => "cfn.client",
            LogChannel::Hup => "cfn.hup",
            LogChannel::Wire => "wire",
            LogChannel::Cmd => "cfn.init.cmd",
        }
    }

    /// Routes a `log` target to a channel.
    ///
    /// Names are hierarchical: `cfn.init.cmd.yum` belongs to `cmd`, and
    /// `cfn.init.sources` to `init`. Unknown targets fall back to `root`.
    pub fn for_target(target: &str) -> LogChannel {
        LogChannel::ALL
            .iter()
            .copied()
            .filter(|channel| *channel != LogChannel::Root)
            .filter(|channel| {
                let name = channel.qualified_name();
                target == name
                    || (target.starts_with(name) && target[name.len()..].starts_with('.'))
            })
            .max_by_key(|channel| channel.qualified_name().len())
            .unwrap_or(LogChannel::Root)
    }
}

impl fmt::Display for LogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogChannel::Root => "root",
            LogChannel::Init => "init",
            LogChannel::Client => "client",
            LogChannel::Hup => "hup",
            LogChannel::Wire => "wire",
            LogChannel::Cmd => "cmd",
        };
        f.write_str(name)
    }
}

impl FromStr for LogChannel {
    type Err = LogError;

    /// Accepts both short names (`init`) and qualified names (`cfn.init`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LogChannel::ALL
            .iter()
            .copied()
            .find(|channel| {
                channel.to_string().eq_ignore_ascii_case(wanted)
                    || (!wanted.is_empty() && channel.qualified_name() == wanted)
            })
            .ok_or_else(|| LogError::Config(format!("unknown log channel '{}'", s)))
    }
}
