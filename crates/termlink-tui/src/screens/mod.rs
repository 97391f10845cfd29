//! Screen implementations. Each screen is a top-level Component.

mod login;
mod terminal;

use crate::component::Component;
use crate::screen::ScreenId;
use crate::session::SessionSettings;

pub use login::LoginScreen;
pub use terminal::TerminalScreen;

/// Build every screen for the given settings.
pub fn create_screens(settings: &SessionSettings) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Login,
            Box::new(LoginScreen::new(&settings.operator, &settings.title)),
        ),
        (
            ScreenId::Terminal,
            Box::new(TerminalScreen::new(&settings.operator, &settings.title)),
        ),
    ]
}
