//! Server configuration.
//!
//! [`Config`] currently carries the mailbox capacity given to every new
//! participant.
//!
//! # Example
//! ```
//! use chat_room::Config;
//!
//! let mut cfg = Config::default();
//! assert_eq!(cfg.mailbox_capacity, 8);
//!
//! cfg.mailbox_capacity = 32;
//! assert_eq!(cfg.mailbox_capacity, 32);
//! ```

use std::env;

use tracing::warn;

use crate::mailbox::DEFAULT_CAPACITY;

/// Environment variable holding the mailbox capacity
pub const MAILBOX_CAPACITY_ENV: &str = "CHAT_MAILBOX_CAPACITY";

/// Chat server configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Slots in each participant's mailbox; extra messages are dropped.
    pub mailbox_capacity: usize,
}

impl Default for Config {
    /// `mailbox_capacity = 8`
    fn default() -> Self {
        Self {
            mailbox_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    /// Read the configuration from `CHAT_MAILBOX_CAPACITY`
    ///
    /// Missing, unparsable, or zero values fall back to the default.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(raw) = env::var(MAILBOX_CAPACITY_ENV) {
            cfg.apply_capacity(&raw);
        }
        cfg
    }

    /// Override the mailbox capacity from a string value
    ///
    /// Invalid values are logged and ignored.
    pub fn apply_capacity(&mut self, raw: &str) {
        match parse_capacity(raw) {
            Some(capacity) => self.mailbox_capacity = capacity,
            None => warn!(
                "Ignoring invalid mailbox capacity '{}', keeping {}",
                raw, self.mailbox_capacity
            ),
        }
    }
}

fn parse_capacity(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(Config::default().mailbox_capacity, 8);
    }

    #[test]
    fn test_apply_capacity() {
        let mut cfg = Config::default();
        cfg.apply_capacity(" 16 ");
        assert_eq!(cfg.mailbox_capacity, 16);
    }

    #[test]
    fn test_invalid_capacity_ignored() {
        let mut cfg = Config::default();
        cfg.apply_capacity("0");
        cfg.apply_capacity("-3");
        cfg.apply_capacity("lots");
        assert_eq!(cfg, Config::default());
    }
}
