pub mod header;
pub mod markers;
pub mod next_prayer;
pub mod prayers;
pub mod statusbar;
