use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use routine_tui::routine::Routine;

use crate::theme;

/// All periodic routine definitions, independent of the selected date.
pub struct RoutineList;

impl RoutineList {
    pub fn render(frame: &mut Frame, area: Rect, routines: &[&Routine], cursor: usize) {
        let t = theme::current();
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" Repeating routines ({}) ", routines.len())
        } else {
            " Repeating ".to_string()
        };

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        if routines.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(Paragraph::new("No repeating routines").style(t.dim), inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;
        let visible = area.height.saturating_sub(2) as usize;
        let scroll = (cursor + 1).saturating_sub(visible);

        let items: Vec<ListItem> = routines
            .iter()
            .enumerate()
            .skip(scroll)
            .map(|(i, r)| {
                let style = if i == cursor { t.selected } else { Style::default() };
                let meta = format!(" {:<8} since {}", r.frequency, r.start_date);
                let label = truncate(
                    &format!(" {}", r.display_line()),
                    inner_w.saturating_sub(meta.chars().count()),
                );
                ListItem::new(Line::from(vec![
                    Span::styled(label, style),
                    Span::styled(meta, t.dim),
                ]))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        format!("{s:<max$}")
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_pads_short_and_cuts_long() {
        assert_eq!(truncate("abc", 5), "abc  ");
        assert_eq!(truncate("abcdefgh", 6), "abc...");
        assert_eq!(truncate("물 마시기 루틴", 5), "물 ...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }
}
