pub mod header;
pub mod next_prayer;
pub mod partner;
pub mod statusbar;
pub mod timeline;
