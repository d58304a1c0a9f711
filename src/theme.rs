use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// What the user picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    System,
}

/// What the page actually renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn css_class(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub applied: Theme,
}

impl ThemeState {
    /// Switches mode. `System` is resolved against `platform` right now and
    /// stays at that value until the next call.
    pub fn set_mode(&mut self, mode: ThemeMode, platform: Theme) -> Theme {
        self.mode = mode;
        self.applied = match mode {
            ThemeMode::Light => Theme::Light,
            ThemeMode::Dark => Theme::Dark,
            ThemeMode::System => platform,
        };
        self.applied
    }
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub mode: ThemeMode,
    #[serde(default)]
    pub prefers_dark: Option<bool>,
}

pub const PREFERS_COLOR_SCHEME: &str = "sec-ch-prefers-color-scheme";

/// Platform preference for a request: the explicit flag from the page, then the
/// client hint header, then light.
pub fn platform_preference(prefers_dark: Option<bool>, headers: &HeaderMap) -> Theme {
    if let Some(dark) = prefers_dark {
        return if dark { Theme::Dark } else { Theme::Light };
    }

    let hinted_dark = headers
        .get(PREFERS_COLOR_SCHEME)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().trim_matches('"').eq_ignore_ascii_case("dark"))
        .unwrap_or(false);

    if hinted_dark { Theme::Dark } else { Theme::Light }
}
