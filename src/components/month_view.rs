use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        days_with_routines: &HashSet<u32>,
    ) {
        let t = theme::current();
        let Some(first_day) = selected_date.with_day(1) else {
            return;
        };

        let block = Block::default()
            .title(format!(" {} ", first_day.format("%B %Y")))
            .title_style(t.header)
            .borders(Borders::ALL)
            .border_style(t.border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header = Line::from(
            DAY_NAMES
                .iter()
                .map(|d| Span::styled(format!("{:^5}", d), t.header))
                .collect::<Vec<_>>(),
        );

        // Sunday-first grid, blank cells before the 1st
        let lead = first_day.weekday().num_days_from_sunday() as usize;
        let mut cells: Vec<Span> = vec![Span::raw("     "); lead];
        for date in first_day.iter_days().take_while(|d| d.month() == first_day.month()) {
            let day = date.day();
            let marker = if days_with_routines.contains(&day) { '*' } else { ' ' };

            let style = if date == selected_date && date == today {
                t.today.patch(t.selected).add_modifier(Modifier::BOLD)
            } else if date == selected_date {
                t.selected
            } else if date == today {
                t.today
            } else {
                Style::default()
            };
            cells.push(Span::styled(format!(" {:>2}{} ", day, marker), style));
        }

        let weeks: Vec<Line> = cells
            .chunks(7)
            .map(|week| Line::from(week.to_vec()))
            .collect();

        let mut constraints = vec![Constraint::Length(1); weeks.len() + 1];
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(inner);

        frame.render_widget(Paragraph::new(header), rows[0]);
        for (i, week) in weeks.into_iter().enumerate() {
            frame.render_widget(Paragraph::new(week), rows[i + 1]);
        }
    }
}
