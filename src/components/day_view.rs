use std::collections::HashSet;

use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use routine_tui::routine::{Frequency, Routine, RoutineId};

use crate::theme;

pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        routines: &[Routine],
        cursor: usize,
        done: &HashSet<RoutineId>,
    ) {
        let w = area.width as usize;
        let t = theme::current();

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let n = routines.len();
        let count_str = if n == 0 {
            String::new()
        } else {
            format!(" {} routine{} ", n, if n == 1 { "" } else { "s" })
        };

        let block = Block::default()
            .title(title)
            .title_style(t.header)
            .title_bottom(Line::from(Span::styled(count_str, t.dim)))
            .borders(Borders::ALL)
            .border_style(t.border);

        if routines.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(Paragraph::new("No routines").style(t.dim), inner);
            return;
        }

        let visible = area.height.saturating_sub(2) as usize;
        let scroll = (cursor + 1).saturating_sub(visible);

        let items: Vec<ListItem> = routines
            .iter()
            .enumerate()
            .skip(scroll)
            .map(|(i, r)| format_routine(r, i == cursor, done.contains(&r.id)))
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

fn format_routine(r: &Routine, selected: bool, done: bool) -> ListItem<'static> {
    let t = theme::current();
    let checkbox = if done { " [x] " } else { " [ ] " };

    let mut text_style = if r.frequency == Frequency::Once {
        t.once
    } else {
        Style::default()
    };
    if done {
        text_style = text_style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
    }
    if selected {
        text_style = t.selected;
    }

    ListItem::new(Line::from(vec![
        Span::styled(checkbox, Style::default()),
        Span::styled(r.display_line(), text_style),
        Span::styled(format!(" ({})", r.frequency), t.dim),
    ]))
}

/// Popup with the full definition of a routine.
pub fn render_detail_popup(
    frame: &mut Frame,
    area: Rect,
    routine: &Routine,
    date: NaiveDate,
    mutable: bool,
) {
    let t = theme::current();
    let popup_w = area.width.clamp(30, 60);
    let popup_h = area.height.clamp(8, 12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", routine.content))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<10}"), t.dim),
            Span::raw(value),
        ])
    };

    let mut lines = vec![
        row("Time:", routine.time.to_string()),
        row("Repeats:", routine.frequency.to_string()),
        row("Since:", routine.start_date.format("%Y-%m-%d").to_string()),
    ];
    if routine.frequency == Frequency::Once {
        let dates: Vec<String> = routine.once_dates.iter().map(|d| d.to_string()).collect();
        lines.push(row("On:", dates.join(", ")));
    }
    lines.push(Line::from(""));
    let verdict = if mutable {
        format!("Editable on {date}")
    } else {
        format!("Locked on {date}")
    };
    lines.push(Line::from(Span::styled(verdict, t.dim)));
    lines.push(Line::from(Span::styled("Press Esc to close", t.dim)));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
