pub mod data;
pub mod debug;
pub mod file;
pub mod map;
pub mod playback;
pub mod scenes;
pub mod states;
pub mod widgets;
