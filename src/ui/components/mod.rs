pub mod progress_bar;
pub mod stats_sidebar;
pub mod typing_area;
