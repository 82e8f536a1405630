use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use routine_tui::routine::{Frequency, Routine, RoutineDraft, RoutineId};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Time,
    Content,
    Frequency,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Time => FormField::Content,
            FormField::Content => FormField::Frequency,
            FormField::Frequency => FormField::Time,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Time => FormField::Frequency,
            FormField::Content => FormField::Time,
            FormField::Frequency => FormField::Content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormMode {
    Add,
    Edit(RoutineId),
}

#[derive(Debug, Clone)]
pub struct RoutineFormState {
    pub mode: FormMode,
    pub time: String,
    pub content: String,
    pub frequency: Frequency,
    pub active_field: FormField,
    /// Last validation failure, shown until the next submit.
    pub error: Option<String>,
}

impl RoutineFormState {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Add,
            time: String::new(),
            content: String::new(),
            frequency: Frequency::Once,
            active_field: FormField::Time,
            error: None,
        }
    }

    /// Pre-filled editor for an existing routine.
    pub fn edit(routine: &Routine) -> Self {
        Self {
            mode: FormMode::Edit(routine.id),
            time: routine.time.to_string(),
            content: routine.content.clone(),
            frequency: routine.frequency,
            active_field: FormField::Time,
            error: None,
        }
    }

    pub fn draft(&self) -> RoutineDraft {
        RoutineDraft::new(self.time.clone(), self.content.clone(), self.frequency.as_str())
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Time => self.time.push(c),
            FormField::Content => self.content.push(c),
            FormField::Frequency => {
                if c == ' ' {
                    self.frequency = self.frequency.next();
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Time => {
                self.time.pop();
            }
            FormField::Content => {
                self.content.pop();
            }
            FormField::Frequency => {}
        }
    }
}

pub struct RoutineForm;

impl RoutineForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &RoutineFormState) {
        let form_w = area.width.clamp(30, 50);
        let form_h = area.height.clamp(9, 11);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h).intersection(area);

        frame.render_widget(Clear, form_area);

        let title = match state.mode {
            FormMode::Add => " New Routine ",
            FormMode::Edit(_) => " Edit Routine ",
        };
        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // time
            Constraint::Length(1), // content
            Constraint::Length(1), // frequency
            Constraint::Length(1), // spacer
            Constraint::Length(1), // error
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        let active = state.active_field;
        render_field(frame, rows[0], "Time:", &state.time, active == FormField::Time);
        render_field(frame, rows[1], "What:", &state.content, active == FormField::Content);
        render_field(
            frame,
            rows[2],
            "Freq:",
            &format!("< {} >", state.frequency),
            active == FormField::Frequency,
        );

        if let Some(ref err) = state.error {
            let msg = Span::styled(err.clone(), Style::default().fg(Color::Red));
            frame.render_widget(Paragraph::new(Line::from(msg)), rows[4]);
        }

        let key = Style::default().add_modifier(Modifier::BOLD);
        let dim = theme::current().dim;
        let help = Line::from(vec![
            Span::styled("Tab", key),
            Span::styled(":Next ", dim),
            Span::styled("Space", key),
            Span::styled(":Freq ", dim),
            Span::styled("Enter", key),
            Span::styled(":Save ", dim),
            Span::styled("Esc", key),
            Span::styled(":Cancel", dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[5]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };
    let style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<7}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use routine_tui::routine::{validate, Collection};

    #[test]
    fn typing_fills_active_field_and_space_cycles_frequency() {
        let mut form = RoutineFormState::new();
        for c in "07:15".chars() {
            form.input_char(c);
        }
        form.active_field = form.active_field.next();
        for c in "Walk dog".chars() {
            form.input_char(c);
        }
        form.active_field = form.active_field.next();
        form.input_char(' ');
        form.input_char('x');

        let fields = validate(&form.draft()).unwrap();
        assert_eq!(fields.time.to_string(), "07:15");
        assert_eq!(fields.content, "Walk dog");
        assert_eq!(fields.frequency, Frequency::Daily);
    }

    #[test]
    fn edit_form_is_prefilled() {
        let mut c = Collection::new();
        let draft = RoutineDraft::new("21:00", "Read", "weekly");
        let id = c.add(validate(&draft).unwrap(), "2024-05-01".parse().unwrap());

        let form = RoutineFormState::edit(c.get(id).unwrap());
        assert_eq!(form.mode, FormMode::Edit(id));
        assert_eq!(form.draft(), draft);
    }

    #[test]
    fn field_cycle_wraps() {
        assert_eq!(FormField::Frequency.next(), FormField::Time);
        assert_eq!(FormField::Time.prev(), FormField::Frequency);
    }
}
