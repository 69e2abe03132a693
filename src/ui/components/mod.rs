pub mod dashboard;
pub mod menu;
pub mod progress_bar;
pub mod typing_area;
