use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use routine_tui::config::ThemeSettings;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme built from config. Later calls are ignored.
pub fn init(settings: &ThemeSettings) {
    let _ = THEME.set(Theme::from_settings(settings));
}

/// Active theme, default if `init` was never called.
pub fn current() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub today: Style,
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    /// One-off routines in the day list.
    pub once: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::palette(
            (Color::Black, Color::Yellow),
            (Color::Black, Color::Cyan),
            Color::White,
            Color::DarkGray,
            Color::Gray,
            (Color::White, Color::DarkGray),
            Color::Yellow,
        )
    }
}

impl Theme {
    fn palette(
        today: (Color, Color),
        selected: (Color, Color),
        header: Color,
        dim: Color,
        border: Color,
        status: (Color, Color),
        once: Color,
    ) -> Self {
        Self {
            today: Style::default().fg(today.0).bg(today.1),
            selected: Style::default().fg(selected.0).bg(selected.1),
            header: Style::default().fg(header).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(dim),
            border: Style::default().fg(border),
            status: Style::default().fg(status.0).bg(status.1),
            once: Style::default().fg(once).add_modifier(Modifier::BOLD),
        }
    }

    /// Built-in preset by name; unknown names fall back to the default.
    pub fn preset(name: &str) -> Self {
        match name {
            "dracula" => Self::palette(
                (Color::Black, Color::Rgb(189, 147, 249)),
                (Color::Black, Color::Rgb(139, 233, 253)),
                Color::Rgb(248, 248, 242),
                Color::Rgb(98, 114, 164),
                Color::Rgb(68, 71, 90),
                (Color::Rgb(248, 248, 242), Color::Rgb(68, 71, 90)),
                Color::Rgb(241, 250, 140),
            ),
            "gruvbox" => Self::palette(
                (Color::Black, Color::Rgb(250, 189, 47)),
                (Color::Black, Color::Rgb(131, 165, 152)),
                Color::Rgb(235, 219, 178),
                Color::Rgb(146, 131, 116),
                Color::Rgb(102, 92, 84),
                (Color::Rgb(235, 219, 178), Color::Rgb(80, 73, 69)),
                Color::Rgb(254, 128, 25),
            ),
            "nord" => Self::palette(
                (Color::Black, Color::Rgb(235, 203, 139)),
                (Color::Black, Color::Rgb(136, 192, 208)),
                Color::Rgb(229, 233, 240),
                Color::Rgb(76, 86, 106),
                Color::Rgb(67, 76, 94),
                (Color::Rgb(229, 233, 240), Color::Rgb(67, 76, 94)),
                Color::Rgb(208, 135, 112),
            ),
            _ => Self::default(),
        }
    }

    pub fn from_settings(settings: &ThemeSettings) -> Self {
        let mut theme = settings
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        let overrides: [(&Option<String>, fn(&mut Theme, Color)); 10] = [
            (&settings.today_fg, |t, c| t.today = t.today.fg(c)),
            (&settings.today_bg, |t, c| t.today = t.today.bg(c)),
            (&settings.selected_fg, |t, c| t.selected = t.selected.fg(c)),
            (&settings.selected_bg, |t, c| t.selected = t.selected.bg(c)),
            (&settings.header_fg, |t, c| t.header = t.header.fg(c)),
            (&settings.dim_fg, |t, c| t.dim = t.dim.fg(c)),
            (&settings.border_fg, |t, c| t.border = t.border.fg(c)),
            (&settings.status_fg, |t, c| t.status = t.status.fg(c)),
            (&settings.status_bg, |t, c| t.status = t.status.bg(c)),
            (&settings.once_fg, |t, c| t.once = t.once.fg(c)),
        ];
        for (value, apply) in overrides {
            if let Some(c) = value.as_deref().and_then(parse_color) {
                apply(&mut theme, c);
            }
        }

        theme
    }
}

/// Parse a color string: hex "#rrggbb", or named colors.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#').filter(|h| h.len() == 6) {
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => None,
    }
}
