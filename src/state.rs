// Application state for the interactive session.
//
// Every update takes the state by value and hands back a new one; the
// dataset is only ever swapped as a whole.
use crate::demo::demo_dataset;
use crate::types::Dataset;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub dataset: Dataset,
    pub theme: Theme,
    pub api_key: Option<String>,
    /// `false` while the built-in demo dataset is shown.
    pub imported: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: demo_dataset(),
            theme: Theme::default(),
            api_key: None,
            imported: false,
        }
    }
}

impl AppState {
    pub fn new(theme: Theme, api_key: Option<String>) -> Self {
        Self::default().with_theme(theme).with_api_key(api_key.as_deref().unwrap_or(""))
    }

    pub fn with_dataset(self, dataset: Dataset) -> Self {
        Self {
            dataset,
            imported: true,
            ..self
        }
    }

    pub fn reset_to_demo(self) -> Self {
        Self {
            dataset: demo_dataset(),
            imported: false,
            ..self
        }
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        Self { theme, ..self }
    }

    pub fn toggle_theme(self) -> Self {
        let theme = self.theme.toggled();
        Self { theme, ..self }
    }

    /// Blank keys clear the stored key.
    pub fn with_api_key(self, key: &str) -> Self {
        let key = key.trim();
        let api_key = if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        };
        Self { api_key, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::transform;

    #[test]
    fn starts_on_demo_light() {
        let s = AppState::default();
        assert_eq!(s.dataset.client_name, "DEMO");
        assert_eq!(s.theme, Theme::Light);
        assert!(!s.imported);
        assert!(s.api_key.is_none());
    }

    #[test]
    fn dataset_is_replaced_whole_and_reset() {
        let (ds, _) = transform("Campaign name,Spend\nA,10", &[], "a.csv");
        let s = AppState::default().with_dataset(ds.clone());
        assert_eq!(s.dataset, ds);
        assert!(s.imported);

        let s = s.reset_to_demo();
        assert_eq!(s.dataset, demo_dataset());
        assert!(!s.imported);
    }

    #[test]
    fn theme_and_key_updates() {
        let s = AppState::new(Theme::Dark, Some("  sk-test ".to_string()));
        assert_eq!(s.theme, Theme::Dark);
        assert_eq!(s.api_key.as_deref(), Some("sk-test"));

        let s = s.toggle_theme().with_api_key("   ");
        assert_eq!(s.theme, Theme::Light);
        assert!(s.api_key.is_none());
    }
}
