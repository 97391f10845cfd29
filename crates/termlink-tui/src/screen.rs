//! Screen identifiers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    /// Gate shown before a session exists.
    #[default]
    Login,
    /// Main terminal; hosts the Last Entries panel.
    Terminal,
}

impl ScreenId {
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Terminal => "TERMINAL",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
