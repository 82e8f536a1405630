mod app;
mod components;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode, ViewMode};
use chrono::Local;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use log::info;
use ratatui::layout::{Constraint, Layout, Rect};
use routine_tui::routine::JsonFileStore;
use routine_tui::{logging, Config};

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load()?;
    let _logger = logging::init_logging(&config.log_level, &config.log_dir)?;
    theme::init(&config.theme);

    let store = JsonFileStore::new(config.data_file.clone());
    let mut app = App::new(
        Box::new(store),
        config.mutation_policy,
        Local::now().date_naive(),
    )?;
    info!(
        "session start: {} routines, policy {:?}",
        app.collection().len(),
        config.mutation_policy
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    if let Err(ref e) = result {
        log::error!("session aborted: {e}");
    }
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();
            let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

            match app.view_mode {
                ViewMode::Month => render_month_layout(frame, layout[0], app),
                ViewMode::Day => render_day(frame, layout[0], app),
                ViewMode::Manage => {
                    components::RoutineList::render(
                        frame,
                        layout[0],
                        &app.periodic_routines(),
                        app.manage_cursor,
                    );
                }
            }

            if let Some(ref form) = app.form_state {
                components::RoutineForm::render(frame, area, form);
            }

            if let Some(routine) = app.detail_routine() {
                components::day_view::render_detail_popup(
                    frame,
                    area,
                    routine,
                    app.selected_date,
                    app.can_mutate(routine),
                );
            }

            if app.show_help {
                render_help(frame, area);
            }

            components::StatusBar::render(
                frame,
                layout[1],
                app.view_mode,
                app.input_mode,
                app.status_message.as_deref(),
            );
        })?;

        if let Some(key) = tui::next_key_event(Duration::from_millis(100))? {
            // Clear status message on any key
            app.status_message = None;

            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            if app.detail.is_some() {
                if key.code == KeyCode::Esc || key.code == KeyCode::Enter {
                    app.close_detail();
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.view_mode = ViewMode::Month,
        (KeyCode::Char('2'), _) => app.view_mode = ViewMode::Day,
        (KeyCode::Char('3'), _) => app.view_mode = ViewMode::Manage,
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('n'), _) => app.open_add_form(),
        (KeyCode::Char('e'), _) => app.open_edit_form(),
        (KeyCode::Char('d'), _) => {
            if let Err(e) = app.delete_selected() {
                app.report_store_error(&e);
            }
        }
        (KeyCode::Char(' '), _) => app.toggle_completed(),
        (KeyCode::Enter, _) => app.show_detail(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_day(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_day(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.cursor_up(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.cursor_down(),
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => {
            if let Err(e) = app.submit_form() {
                app.report_store_error(&e);
            }
        }
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}

fn render_day(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    components::DayView::render(
        frame,
        area,
        app.selected_date,
        &app.day_routines,
        app.day_cursor,
        &app.completed_on_selected(),
    );
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let w = area.width;
    if w < 60 {
        components::MonthView::render(
            frame,
            area,
            app.selected_date,
            app.today,
            &app.days_with_routines,
        );
        return;
    }

    let month_w = if w >= 100 { 44 } else { 37 };
    let content = Layout::horizontal([Constraint::Length(month_w), Constraint::Min(20)]).split(area);

    components::MonthView::render(
        frame,
        content[0],
        app.selected_date,
        app.today,
        &app.days_with_routines,
    );
    render_day(frame, content[1], app);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.clamp(30, 52);
    let popup_h = area.height.clamp(12, 22);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let entry = |keys: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<10}"), key_style),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        entry("h/l", "Previous/next day"),
        entry("[/]", "Previous/next month"),
        entry("t", "Jump to today"),
        entry("j/k", "Move selection"),
        Line::from(""),
        Line::from(Span::styled("Views", section_style)),
        entry("1/2/3", "Month / Day / Repeating"),
        Line::from(""),
        Line::from(Span::styled("Routines", section_style)),
        entry("n", "Add routine on selected day"),
        entry("e", "Edit selected routine"),
        entry("d", "Delete selected routine"),
        entry("Space", "Check off for this day"),
        entry("Enter", "Show details"),
        Line::from(""),
        entry("Esc", "Close popup or form"),
        entry("q", "Quit"),
    ];

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}
