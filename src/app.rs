use std::collections::HashSet;

use chrono::{Datelike, Months, NaiveDate};
use log::{debug, error, info, warn};
use routine_tui::error::StoreError;
use routine_tui::routine::{
    ensure_mutable, occurrence_days, resolve_occurrences, validate, Collection, MutationPolicy,
    Routine, RoutineId, RoutineStore,
};

use crate::components::routine_form::{FormMode, RoutineFormState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Month,
    Day,
    Manage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
}

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    /// Occurrences on `selected_date`, in display order.
    pub day_routines: Vec<Routine>,
    pub days_with_routines: HashSet<u32>,
    pub day_cursor: usize,
    pub manage_cursor: usize,
    pub form_state: Option<RoutineFormState>,
    pub detail: Option<RoutineId>,
    pub show_help: bool,
    pub status_message: Option<String>,
    /// Checked-off occurrences; kept for the session only.
    completed: HashSet<(RoutineId, NaiveDate)>,
    collection: Collection,
    policy: MutationPolicy,
    store: Box<dyn RoutineStore>,
}

impl App {
    pub fn new(
        store: Box<dyn RoutineStore>,
        policy: MutationPolicy,
        today: NaiveDate,
    ) -> Result<Self, StoreError> {
        let collection = store.load()?;

        let mut app = Self {
            running: true,
            view_mode: ViewMode::Month,
            input_mode: InputMode::Normal,
            selected_date: today,
            today,
            day_routines: Vec::new(),
            days_with_routines: HashSet::new(),
            day_cursor: 0,
            manage_cursor: 0,
            form_state: None,
            detail: None,
            show_help: false,
            status_message: None,
            completed: HashSet::new(),
            collection,
            policy,
            store,
        };
        app.refresh();
        Ok(app)
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn periodic_routines(&self) -> Vec<&Routine> {
        self.collection.periodic().collect()
    }

    pub fn refresh(&mut self) {
        self.day_routines = resolve_occurrences(self.selected_date, &self.collection)
            .into_iter()
            .cloned()
            .collect();
        self.days_with_routines = occurrence_days(
            self.selected_date.year(),
            self.selected_date.month(),
            &self.collection,
        );
        self.day_cursor = clamp_cursor(self.day_cursor, self.day_routines.len());
        self.manage_cursor = clamp_cursor(self.manage_cursor, self.collection.periodic().count());
    }

    pub fn next_day(&mut self) {
        self.go_to(self.selected_date.succ_opt().unwrap_or(self.selected_date));
    }

    pub fn prev_day(&mut self) {
        self.go_to(self.selected_date.pred_opt().unwrap_or(self.selected_date));
    }

    /// Same day next month, clamped to the month's last day.
    pub fn next_month(&mut self) {
        let target = self.selected_date.checked_add_months(Months::new(1));
        self.go_to(target.unwrap_or(self.selected_date));
    }

    pub fn prev_month(&mut self) {
        let target = self.selected_date.checked_sub_months(Months::new(1));
        self.go_to(target.unwrap_or(self.selected_date));
    }

    pub fn go_to_today(&mut self) {
        self.go_to(self.today);
    }

    pub fn go_to(&mut self, date: NaiveDate) {
        if date != self.selected_date {
            self.day_cursor = 0;
        }
        self.selected_date = date;
        self.refresh();
    }

    pub fn cursor_down(&mut self) {
        match self.view_mode {
            ViewMode::Manage => {
                let len = self.collection.periodic().count();
                self.manage_cursor = clamp_cursor(self.manage_cursor + 1, len);
            }
            ViewMode::Month | ViewMode::Day => {
                self.day_cursor = clamp_cursor(self.day_cursor + 1, self.day_routines.len());
            }
        }
    }

    pub fn cursor_up(&mut self) {
        match self.view_mode {
            ViewMode::Manage => self.manage_cursor = self.manage_cursor.saturating_sub(1),
            ViewMode::Month | ViewMode::Day => self.day_cursor = self.day_cursor.saturating_sub(1),
        }
    }

    /// Routine under the cursor in the current view.
    pub fn selected_routine(&self) -> Option<&Routine> {
        match self.view_mode {
            ViewMode::Manage => self.collection.periodic().nth(self.manage_cursor),
            ViewMode::Month | ViewMode::Day => self.day_routines.get(self.day_cursor),
        }
    }

    pub fn is_completed(&self, id: RoutineId) -> bool {
        self.completed.contains(&(id, self.selected_date))
    }

    pub fn completed_on_selected(&self) -> HashSet<RoutineId> {
        self.day_routines
            .iter()
            .map(|r| r.id)
            .filter(|id| self.is_completed(*id))
            .collect()
    }

    pub fn toggle_completed(&mut self) {
        let Some(id) = self.day_routines.get(self.day_cursor).map(|r| r.id) else {
            return;
        };
        let key = (id, self.selected_date);
        if !self.completed.remove(&key) {
            self.completed.insert(key);
        }
    }

    pub fn show_detail(&mut self) {
        self.detail = self.selected_routine().map(|r| r.id);
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn detail_routine(&self) -> Option<&Routine> {
        self.detail.and_then(|id| self.collection.get(id))
    }

    /// Whether the gate allows changing `routine` on the selected date.
    pub fn can_mutate(&self, routine: &Routine) -> bool {
        self.policy.permits(self.selected_date, routine)
    }

    pub fn open_add_form(&mut self) {
        self.form_state = Some(RoutineFormState::new());
        self.input_mode = InputMode::Form;
    }

    pub fn open_edit_form(&mut self) {
        let Some(routine) = self.selected_routine().cloned() else {
            return;
        };
        if !self.passes_gate(&routine) {
            return;
        }
        self.form_state = Some(RoutineFormState::edit(&routine));
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(form) = self.form_state.as_mut() {
            form.input_char(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(form) = self.form_state.as_mut() {
            form.backspace();
        }
    }

    pub fn form_tab(&mut self) {
        if let Some(form) = self.form_state.as_mut() {
            form.active_field = form.active_field.next();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(form) = self.form_state.as_mut() {
            form.active_field = form.active_field.prev();
        }
    }

    /// Validate and apply the open form. Validation failures keep the form
    /// open; store failures are returned to the caller.
    pub fn submit_form(&mut self) -> Result<(), StoreError> {
        let Some(form) = self.form_state.as_mut() else {
            return Ok(());
        };

        let fields = match validate(&form.draft()) {
            Ok(fields) => fields,
            Err(e) => {
                debug!("form rejected: {e}");
                form.error = Some(e.to_string());
                return Ok(());
            }
        };

        let mode = form.mode;
        let mut next = self.collection.clone();
        let message = match mode {
            FormMode::Add => {
                let id = next.add(fields, self.selected_date);
                info!("added routine {id} on {}", self.selected_date);
                "Routine added"
            }
            FormMode::Edit(id) => {
                if let Err(e) = next.update(id, fields) {
                    warn!("edit of vanished routine: {e}");
                    self.close_form();
                    self.status_message = Some(e.to_string());
                    return Ok(());
                }
                info!("updated routine {id}");
                "Routine updated"
            }
        };

        self.commit(next)?;
        self.close_form();
        self.status_message = Some(message.to_string());
        Ok(())
    }

    pub fn delete_selected(&mut self) -> Result<(), StoreError> {
        let Some(routine) = self.selected_routine().cloned() else {
            return Ok(());
        };
        if !self.passes_gate(&routine) {
            return Ok(());
        }

        let mut next = self.collection.clone();
        if let Err(e) = next.remove(routine.id) {
            self.status_message = Some(e.to_string());
            return Ok(());
        }
        self.commit(next)?;
        self.completed.retain(|(id, _)| *id != routine.id);
        info!("deleted routine {} ({})", routine.id, routine.content);
        self.status_message = Some(format!("Deleted '{}'", routine.content));
        Ok(())
    }

    /// Surface a failed save without ending the session. The collection is
    /// still the last one that was written successfully.
    pub fn report_store_error(&mut self, err: &StoreError) {
        error!("store write failed: {err}");
        self.status_message = Some(err.to_string());
    }

    /// Day rows are gated against the selected date. The repeating list edits
    /// definitions and is not date-bound.
    fn passes_gate(&mut self, routine: &Routine) -> bool {
        if self.view_mode == ViewMode::Manage {
            return true;
        }
        match ensure_mutable(self.policy, self.selected_date, routine) {
            Ok(()) => true,
            Err(denied) => {
                debug!("gate denied: {denied}");
                self.status_message = Some(format!("'{}': {denied}", routine.content));
                false
            }
        }
    }

    /// Save first, then adopt, so a failed write leaves the session unchanged.
    fn commit(&mut self, next: Collection) -> Result<(), StoreError> {
        self.store.save(&next)?;
        self.collection = next;
        self.refresh();
        Ok(())
    }
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use routine_tui::routine::{Frequency, MemoryStore};

    use super::*;

    /// Shares one MemoryStore between the app and the test body.
    struct SharedStore(Rc<MemoryStore>);

    impl RoutineStore for SharedStore {
        fn load(&self) -> Result<Collection, StoreError> {
            self.0.load()
        }

        fn save(&self, collection: &Collection) -> Result<(), StoreError> {
            self.0.save(collection)
        }
    }

    const DOC: &str = r#"{
        "routines": [
            {"time": "09:00", "content": "A", "frequency": "once", "start_date": "2024-05-01", "dates": ["2024-05-01"]},
            {"time": "09:00", "content": "B", "frequency": "daily", "start_date": "2024-04-20"},
            {"time": "07:00", "content": "W", "frequency": "weekly", "start_date": "2024-05-01"}
        ],
        "repeating_routines": []
    }"#;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn app_on(day: &str) -> (App, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::with_document(DOC));
        let app = App::new(
            Box::new(SharedStore(store.clone())),
            MutationPolicy::Compatible,
            date(day),
        )
        .unwrap();
        (app, store)
    }

    fn day_contents(app: &App) -> Vec<&str> {
        app.day_routines.iter().map(|r| r.content.as_str()).collect()
    }

    fn type_into(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form_input_char(c);
        }
    }

    #[test]
    fn loads_and_resolves_selected_day() {
        let (app, _) = app_on("2024-05-01");
        assert_eq!(day_contents(&app), ["W", "A", "B"]);
        assert!(app.days_with_routines.contains(&8));
    }

    #[test]
    fn delete_saves_reduced_collection() {
        let (mut app, store) = app_on("2024-05-01");
        app.day_cursor = 2; // B
        app.delete_selected().unwrap();

        assert_eq!(store.save_count(), 1);
        let saved = store.load().unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|r| r.content != "B"));
        assert_eq!(day_contents(&app), ["W", "A"]);

        app.go_to(date("2024-06-01"));
        assert!(day_contents(&app).is_empty());
    }

    #[test]
    fn gate_denial_leaves_store_untouched() {
        let (mut app, store) = app_on("2024-05-02");
        app.view_mode = ViewMode::Day;
        // W is off-cycle on 05-02 and so not listed; gate it directly
        let weekly = app.collection().iter().find(|r| r.content == "W").unwrap().clone();
        assert!(!app.passes_gate(&weekly));
        assert!(app.status_message.as_deref().unwrap().contains("cannot be changed"));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn add_routine_through_form() {
        let (mut app, store) = app_on("2024-05-03");
        app.open_add_form();
        type_into(&mut app, "06:30");
        app.form_tab();
        type_into(&mut app, "Run");
        app.form_tab();
        app.form_input_char(' '); // once -> daily
        app.submit_form().unwrap();

        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(store.save_count(), 1);
        let added = app.collection().iter().find(|r| r.content == "Run").unwrap();
        assert_eq!(added.frequency, Frequency::Daily);
        assert_eq!(added.start_date, date("2024-05-03"));
        assert_eq!(day_contents(&app), ["Run", "B"]);
    }

    #[test]
    fn invalid_form_stays_open_without_saving() {
        let (mut app, store) = app_on("2024-05-03");
        app.open_add_form();
        type_into(&mut app, "9:00");
        app.form_tab();
        type_into(&mut app, "Late");
        app.submit_form().unwrap();

        assert_eq!(app.input_mode, InputMode::Form);
        let err = app.form_state.as_ref().unwrap().error.as_deref().unwrap();
        assert!(err.contains("HH:MM"));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn edit_updates_fields_but_not_anchor() {
        let (mut app, _) = app_on("2024-05-08");
        assert_eq!(day_contents(&app), ["W", "B"]);
        app.day_cursor = 0;
        app.open_edit_form();
        assert_eq!(app.input_mode, InputMode::Form);

        app.form_backspace();
        app.form_backspace();
        type_into(&mut app, "45");
        app.submit_form().unwrap();

        let w = app.collection().iter().find(|r| r.content == "W").unwrap();
        assert_eq!(w.time.to_string(), "07:45");
        assert_eq!(w.start_date, date("2024-05-01"));
    }

    #[test]
    fn failed_save_keeps_previous_collection() {
        let (mut app, store) = app_on("2024-05-01");
        store.fail_writes(true);
        app.day_cursor = 1; // A
        let err = app.delete_selected().unwrap_err();
        assert!(err.is_write_error());
        app.report_store_error(&err);
        assert!(app.running);
        assert_eq!(app.status_message, Some(err.to_string()));
        assert_eq!(app.collection().len(), 3);
        assert_eq!(day_contents(&app), ["W", "A", "B"]);
    }

    #[test]
    fn manage_view_lists_periodic_and_skips_gate() {
        let (mut app, store) = app_on("2024-05-02");
        app.view_mode = ViewMode::Manage;
        let names: Vec<&str> = app.periodic_routines().iter().map(|r| r.content.as_str()).collect();
        assert_eq!(names, ["B", "W"]);

        app.cursor_down();
        app.delete_selected().unwrap();
        assert_eq!(store.save_count(), 1);
        assert!(app.collection().iter().all(|r| r.content != "W"));
    }

    #[test]
    fn completion_is_per_date() {
        let (mut app, store) = app_on("2024-05-01");
        app.toggle_completed();
        let first = app.day_routines[0].id;
        assert!(app.is_completed(first));

        app.next_day();
        assert!(app.completed_on_selected().is_empty());
        app.prev_day();
        assert!(app.is_completed(first));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn month_navigation_clamps_day() {
        let (mut app, _) = app_on("2024-01-31");
        app.next_month();
        assert_eq!(app.selected_date, date("2024-02-29"));
        app.prev_month();
        assert_eq!(app.selected_date, date("2024-01-29"));
    }
}
