use bevy::prelude::*;
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::fs;
use crate::file::config::AppConfig;
use std::path::{ Path, PathBuf };
use crate::states::StartupLatch;

#[derive(Resource, Debug, Clone, Deserialize, Serialize)]
pub struct Theme {
    #[serde(with = "srgb_float")]
    pub primary: Color,
    #[serde(with = "srgb_float")]
    pub accent: Color,
    #[serde(with = "srgb_float")]
    pub track: Color,
    #[serde(with = "srgb_float")]
    pub track_fill: Color,
    #[serde(with = "srgb_float")]
    pub text_primary: Color,
    #[serde(with = "srgb_float")]
    pub text_secondary: Color,
    #[serde(with = "srgb_float")]
    pub background_default: Color,
    #[serde(with = "srgb_float")]
    pub background_paper: Color,
    #[serde(with = "srgb_float")]
    pub divider: Color,
    #[serde(with = "srgb_float")]
    pub error_main: Color,
}

#[derive(Debug, Deserialize, Serialize, Resource)]
pub struct Themes {
    pub themes: HashMap<String, Theme>,
}

impl Themes {
    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }
}

pub fn setup_theme(
    mut commands: Commands,
    config: Res<AppConfig>,
    mut latch: ResMut<StartupLatch>
) {
    let theme_path = PathBuf::from(&config.saves.directory).join(&config.saves.theme_file);

    if !Path::new(&theme_path).exists() {
        warn!("Theme file not found at '{}', creating default theme file...", theme_path.display());
        let default_themes = create_default_themes();
        let yaml = serde_yaml
            ::to_string(&default_themes)
            .expect("Failed to serialize default themes");
        fs::write(&theme_path, yaml).expect("Failed to write default theme file");
    }

    let content = fs
        ::read_to_string(&theme_path)
        .unwrap_or_else(|_| panic!("Failed to read theme file at: {}", theme_path.display()));

    let parsed: Themes = serde_yaml
        ::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse theme YAML: {e}"));

    commands.insert_resource(parsed);
    latch.theme_loaded = true;
}

fn create_default_themes() -> Themes {
    let mut themes = HashMap::new();

    themes.insert("default".to_string(), Theme {
        primary: Color::srgb(0.2, 0.6, 0.9), // #3399e6
        accent: Color::srgb(0.949, 0.6, 0.2), // #f29933
        track: Color::srgb(0.165, 0.18, 0.2), // #2a2e33
        track_fill: Color::srgb(0.2, 0.45, 0.7), // #3373b3
        text_primary: Color::srgb(0.898, 0.91, 0.922), // #e5e8eb
        text_secondary: Color::srgb(0.6, 0.64, 0.68), // #99a3ad
        background_default: Color::srgb(0.051, 0.067, 0.09), // #0d1117
        background_paper: Color::srgb(0.086, 0.106, 0.133), // #161b22
        divider: Color::srgb(0.231, 0.255, 0.28), // #3b4147
        error_main: Color::srgb(0.9569, 0.2627, 0.2118), // #f44336
    });

    Themes { themes }
}

mod srgb_float {
    use bevy::prelude::Color;
    use serde::de::{ Deserializer };
    use serde::ser::{ SerializeSeq, Serializer };
    use serde::{ Deserialize };

    pub fn serialize<S>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        let srgba = color.to_srgba();
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&srgba.red)?;
        seq.serialize_element(&srgba.green)?;
        seq.serialize_element(&srgba.blue)?;
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color, D::Error>
        where D: Deserializer<'de>
    {
        let rgb: [f32; 3] = <[f32; 3]>::deserialize(deserializer)?;
        Ok(Color::srgb(rgb[0], rgb[1], rgb[2]))
    }
}
