//! Application state types and entry glue.
//!
//! Defines the screens, input modes, modal dialogs and theme of the TUI, and
//! the [`AppState`] that owns the user store, the local slot and the API handle.
//! The event loop lives in [`update`] (re-exported as `run`).
//!
pub mod keymap;
pub mod update;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use ratatui::style::Color;

use crate::api::UserApi;
use crate::forms::add::AddUserForm;
use crate::forms::edit::EditUserForm;
use crate::forms::login::LoginForm;
use crate::model::User;
use crate::search::{ListView, visible_page};
use crate::storage::LocalStore;
use crate::store::UserStore;

use keymap::Keymap;

/// Which page of the application is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Login,
    Users,
    AddUser,
    /// Edit form for the user with this email.
    EditUser { email: String },
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Form,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub badge: Color,
    pub valid: Color,
    pub invalid: Color,
}

impl Theme {
    /// Plain 16-color fallback.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            badge: Color::Green,
            valid: Color::Green,
            invalid: Color::Red,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            badge: Color::Rgb(0xa6, 0xe3, 0xa1),        // green
            valid: Color::Rgb(0xa6, 0xe3, 0xa1),        // green
            invalid: Color::Rgb(0xf3, 0x8b, 0xa8),      // red
        }
    }

    /// Load theme from a key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let Some(color) = Self::parse_color(val) else {
                continue;
            };
            match key.trim() {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "badge" => theme.badge = color,
                "valid" => theme.valid = color,
                "invalid" => theme.invalid = color,
                _ => {}
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn color_to_str(c: Color) -> String {
        match c {
            Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Reset => "reset".to_string(),
            // Named colors get a best-effort hex approximation
            Color::Black => "#000000".to_string(),
            Color::Red => "#FF0000".to_string(),
            Color::Green => "#00FF00".to_string(),
            Color::Yellow => "#FFFF00".to_string(),
            Color::Blue => "#0000FF".to_string(),
            Color::Magenta => "#FF00FF".to_string(),
            Color::Cyan => "#00FFFF".to_string(),
            Color::Gray => "#B3B3B3".to_string(),
            Color::DarkGray => "#4D4D4D".to_string(),
            Color::White => "#FFFFFF".to_string(),
            other => format!("{:?}", other),
        }
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-manager theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        let entries = [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("badge", self.badge),
            ("valid", self.valid),
            ("invalid", self.invalid),
        ];
        for (k, v) in entries {
            let _ = writeln!(&mut buf, "{} = {}", k, Self::color_to_str(v));
        }

        std::fs::write(path, buf)
    }

    /// Load the theme file, writing the default one first if it is missing.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(path) {
            tracing::debug!(path = %path.display(), error = %e, "could not write default theme");
        }
        t
    }
}

/// Modal dialogs layered over the current screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    /// Blocking message; any confirm key closes it.
    Info { message: String },
    DeleteConfirm {
        email: String,
        name: String,
        /// 0 = Yes, 1 = No
        selected: usize,
    },
    Help { scroll: u16 },
}

pub struct AppState {
    pub started_at: Instant,
    pub store: UserStore,
    pub storage: LocalStore,
    pub api: Arc<dyn UserApi>,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub search_query: String,
    /// 1-based page of the user list.
    pub current_page: usize,
    /// Row within the current page.
    pub selected_index: usize,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub show_keybinds: bool,
    pub login: LoginForm,
    pub add_form: Option<AddUserForm>,
    pub edit_form: Option<EditUserForm>,
    pub fetch_limit: usize,
    /// Last ticket handed to a form submission; verdicts carry it back.
    pub last_ticket: u64,
}

impl AppState {
    pub fn new(api: Arc<dyn UserApi>, storage: LocalStore, start: Screen) -> Self {
        let mut app = Self {
            started_at: Instant::now(),
            store: UserStore::new(),
            storage,
            api,
            screen: Screen::Login,
            input_mode: InputMode::Form,
            search_query: String::new(),
            current_page: 1,
            selected_index: 0,
            theme: Theme::dark(),
            keymap: Keymap::default(),
            modal: None,
            show_keybinds: false,
            login: LoginForm::new(),
            add_form: None,
            edit_form: None,
            fetch_limit: 100,
            last_ticket: 0,
        };
        app.go_to(start);
        app
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn with_fetch_limit(mut self, limit: usize) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// The page of users currently on screen.
    pub fn view(&self) -> ListView<'_> {
        visible_page(self.store.users(), &self.search_query, self.current_page)
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.view().rows.get(self.selected_index).copied()
    }

    /// Input mode that belongs to the current screen when nothing overlays it.
    pub fn base_mode(&self) -> InputMode {
        match self.screen {
            Screen::Users => InputMode::Normal,
            Screen::Login | Screen::AddUser | Screen::EditUser { .. } => InputMode::Form,
        }
    }

    pub fn go_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = self.base_mode();
    }

    /// Back to a fresh list view: first page, no query.
    pub fn show_list(&mut self) {
        self.add_form = None;
        self.edit_form = None;
        self.search_query.clear();
        self.current_page = 1;
        self.selected_index = 0;
        self.go_to(Screen::Users);
    }

    /// Show a blocking message.
    pub fn alert(&mut self, message: impl Into<String>) {
        self.modal = Some(ModalState::Info { message: message.into() });
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = self.base_mode();
    }

    /// Keep the selection inside the rows of the current page.
    pub fn clamp_selection(&mut self) {
        let rows = self.view().rows.len();
        self.selected_index = self.selected_index.min(rows.saturating_sub(1));
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_color_accepts_hex_with_or_without_hash() {
        assert_eq!(Theme::parse_color("#0a0B0c"), Some(Color::Rgb(10, 11, 12)));
        assert_eq!(Theme::parse_color("ffffff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_color("reset"), Some(Color::Reset));
        assert_eq!(Theme::parse_color("#12345"), None);
        assert_eq!(Theme::parse_color("zzzzzz"), None);
    }
}
