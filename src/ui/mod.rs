pub mod dialogs;
pub mod highlights;
pub mod theme;
pub mod timeline;
pub mod toolbar;
