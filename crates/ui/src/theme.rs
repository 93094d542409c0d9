use std::path::PathBuf;

use gpui::*;
use gpui_component::{Theme, ThemeMode};
use mimic_chat::ThemeChoice;

/// Returns the default themes directory path.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

pub fn theme_mode(choice: ThemeChoice) -> ThemeMode {
    if choice.is_dark() {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    }
}

pub fn apply_theme(choice: ThemeChoice, window: Option<&mut Window>, cx: &mut App) {
    Theme::change(theme_mode(choice), window, cx);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_maps_to_matching_mode() {
        assert_eq!(theme_mode(ThemeChoice::Light), ThemeMode::Light);
        assert_eq!(theme_mode(ThemeChoice::Dark), ThemeMode::Dark);
    }

    #[test]
    fn themes_path_is_relative_to_working_dir() {
        assert_eq!(default_themes_path(), PathBuf::from("./themes"));
    }
}
