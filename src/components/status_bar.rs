use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{InputMode, ViewMode};
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        view_mode: ViewMode,
        input_mode: InputMode,
        message: Option<&str>,
    ) {
        let w = area.width as usize;
        let style = theme::current().status;

        let mode_str = match view_mode {
            ViewMode::Month => "[1]Month",
            ViewMode::Day => "[2]Day",
            ViewMode::Manage => "[3]Repeating",
        };
        let focus = match input_mode {
            InputMode::Form => " [Form]",
            InputMode::Normal => "",
        };

        // A pending message replaces the key hints
        let right = match message {
            Some(msg) => format!(" {} ", msg),
            None => hints(view_mode, w).to_string(),
        };

        let left = format!(" {}{} ", mode_str, focus);
        let padding = " ".repeat(w.saturating_sub(left.chars().count() + right.chars().count()));

        let line = Line::from(vec![
            Span::styled(left, style),
            Span::styled(padding, style),
            Span::styled(right, style),
        ]);
        frame.render_widget(Paragraph::new(line).style(style), area);
    }
}

fn hints(view_mode: ViewMode, w: usize) -> &'static str {
    match view_mode {
        ViewMode::Month | ViewMode::Day if w >= 80 => {
            " hl:Day [/]:Mon t:Today jk:Select n:New e:Edit d:Del Sp:Done ?:Help q:Quit"
        }
        ViewMode::Manage if w >= 60 => " jk:Select e:Edit d:Del 1:Back ?:Help q:Quit",
        _ if w >= 40 => " n:New e:Edit d:Del ?:Help q:Quit",
        _ => " ?:Help q:Quit",
    }
}
