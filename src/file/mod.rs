pub mod theme;
pub mod settings;
pub mod config;
pub mod feed;


pub use settings::{Settings, DisplayMode};
pub use config::{AppConfig, ConfigError, MapOptions};
pub use theme::{Theme, Themes};
