//! Presentation toggles that live outside the generation session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Colour scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "sun.svg",
            Theme::Dark => "moon.svg",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Visibility of the side menu and parameters panel, plus the theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelState {
    pub theme: Theme,
    pub menu_visible: bool,
    pub parameters_visible: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            menu_visible: true,
            parameters_visible: false,
        }
    }
}

impl PanelState {
    /// Switch between light and dark, returning the new theme
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_visible = !self.menu_visible;
        self.menu_visible
    }

    pub fn toggle_parameters(&mut self) -> bool {
        self.parameters_visible = !self.parameters_visible;
        self.parameters_visible
    }

    /// The document-count input is only shown in RAG mode
    pub fn rag_config_visible(&self, rag_enabled: bool) -> bool {
        rag_enabled
    }
}

/// Label shown next to the document picker
pub fn file_count_label(count: usize) -> String {
    match count {
        0 => "No files selected".to_string(),
        1 => "1 file selected".to_string(),
        n => format!("{} files selected", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_toggle_round_trip() {
        let mut panels = PanelState::default();
        assert_eq!(panels.theme.icon(), "sun.svg");

        assert_eq!(panels.toggle_theme(), Theme::Dark);
        assert_eq!(panels.theme.icon(), "moon.svg");
        assert_eq!(panels.theme.to_string(), "dark");

        assert_eq!(panels.toggle_theme(), Theme::Light);
    }

    #[test]
    fn test_panel_toggles() {
        let mut panels = PanelState::default();
        assert!(!panels.toggle_menu());
        assert!(panels.toggle_menu());
        assert!(panels.toggle_parameters());
        assert!(!panels.toggle_parameters());
    }

    #[test]
    fn test_rag_config_follows_mode() {
        let panels = PanelState::default();
        assert!(panels.rag_config_visible(true));
        assert!(!panels.rag_config_visible(false));
    }

    #[test]
    fn test_file_count_label() {
        assert_eq!(file_count_label(0), "No files selected");
        assert_eq!(file_count_label(1), "1 file selected");
        assert_eq!(file_count_label(7), "7 files selected");
    }
}
