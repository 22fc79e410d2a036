pub mod components;
pub mod layout;
pub mod status;
pub mod theme;
