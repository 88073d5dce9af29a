use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Terminal styles for command output
#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Style,
    pub ok: Style,
    pub failure: Style,
    pub caution: Style,
    pub note: Style,
    pub label: Style,
    /// Missing values and empty results
    pub absent: Style,
    /// CAS numbers
    pub identifier: Style,
    /// Carcinogen classes and other hazard markers
    pub hazard: Style,
}

impl Theme {
    /// Colors only when stdout is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        if no_color || !console::Term::stdout().is_term() {
            Self::plain()
        } else {
            Self::colored()
        }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            ok: Style::new().green().bold(),
            failure: Style::new().red().bold(),
            caution: Style::new().yellow().bold(),
            note: Style::new().magenta(),
            label: Style::new().white().dimmed(),
            absent: Style::new().bright_black(),
            identifier: Style::new().blue().bold(),
            hazard: Style::new().red(),
        }
    }

    pub fn plain() -> Self {
        Self {
            title: Style::new(),
            ok: Style::new(),
            failure: Style::new(),
            caution: Style::new(),
            note: Style::new(),
            label: Style::new(),
            absent: Style::new(),
            identifier: Style::new(),
            hazard: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
