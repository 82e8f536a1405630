pub mod day_view;
pub mod month_view;
pub mod routine_form;
pub mod routine_list;
pub mod status_bar;

pub use day_view::DayView;
pub use month_view::MonthView;
pub use routine_form::RoutineForm;
pub use routine_list::RoutineList;
pub use status_bar::StatusBar;
