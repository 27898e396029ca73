//! User settings for the desktop-name display.

use std::time::Duration;

use prefs::{PrefsExt, PrefsStore};

/// Preference key: show the current desktop name.
pub const SHOW_NAME_KEY: &str = "showDesktopName";
/// Preference key: briefly expand the notch on desktop switches.
pub const AUTO_EXPAND_KEY: &str = "desktopNameAutoExpandOnNotch";
/// Preference key: seconds before an auto-expanded notch collapses.
pub const AUTO_HIDE_DELAY_KEY: &str = "desktopNameAutoHideDelay";

/// True for the preference keys that make up [`DesktopSettings`].
pub fn is_settings_key(key: &str) -> bool {
    matches!(key, SHOW_NAME_KEY | AUTO_EXPAND_KEY | AUTO_HIDE_DELAY_KEY)
}

/// Shortest auto-hide delay, in seconds.
pub const MIN_AUTO_HIDE_DELAY: f64 = 0.5;
/// Longest auto-hide delay, in seconds.
pub const MAX_AUTO_HIDE_DELAY: f64 = 5.0;
/// Granularity of the auto-hide delay, in seconds.
pub const AUTO_HIDE_DELAY_STEP: f64 = 0.5;
/// Default auto-hide delay, in seconds.
pub const DEFAULT_AUTO_HIDE_DELAY: f64 = 1.5;

/// Desktop-name display settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesktopSettings {
    /// Show the current desktop name.
    pub show_desktop_name: bool,
    /// Expand the notch briefly when switching desktops.
    pub auto_expand_on_notch: bool,
    /// Seconds before the expanded notch collapses; always normalized.
    pub(crate) auto_hide_delay: f64,
}

impl Default for DesktopSettings {
    fn default() -> Self {
        Self {
            show_desktop_name: true,
            auto_expand_on_notch: true,
            auto_hide_delay: DEFAULT_AUTO_HIDE_DELAY,
        }
    }
}

impl DesktopSettings {
    /// Clamp `secs` into range and snap it to the step grid. Non-finite input
    /// yields the default.
    pub fn normalize_delay(secs: f64) -> f64 {
        if !secs.is_finite() {
            return DEFAULT_AUTO_HIDE_DELAY;
        }
        let clamped = secs.clamp(MIN_AUTO_HIDE_DELAY, MAX_AUTO_HIDE_DELAY);
        (clamped / AUTO_HIDE_DELAY_STEP).round() * AUTO_HIDE_DELAY_STEP
    }

    /// Auto-hide delay in seconds.
    pub fn auto_hide_delay_secs(&self) -> f64 {
        self.auto_hide_delay
    }

    /// Auto-hide delay as a duration.
    pub fn auto_hide_delay(&self) -> Duration {
        Duration::from_secs_f64(self.auto_hide_delay)
    }

    /// Set the auto-hide delay, normalizing it.
    pub fn set_auto_hide_delay(&mut self, secs: f64) {
        self.auto_hide_delay = Self::normalize_delay(secs);
    }

    /// Auto-expand only applies while the name is shown.
    pub fn auto_expand_enabled(&self) -> bool {
        self.show_desktop_name && self.auto_expand_on_notch
    }

    /// Read settings from `store`, using defaults for missing keys.
    pub fn load(store: &dyn PrefsStore) -> prefs::Result<Self> {
        let defaults = Self::default();
        let mut s = Self {
            show_desktop_name: store
                .get_typed(SHOW_NAME_KEY)?
                .unwrap_or(defaults.show_desktop_name),
            auto_expand_on_notch: store
                .get_typed(AUTO_EXPAND_KEY)?
                .unwrap_or(defaults.auto_expand_on_notch),
            auto_hide_delay: defaults.auto_hide_delay,
        };
        if let Some(delay) = store.get_typed::<f64>(AUTO_HIDE_DELAY_KEY)? {
            s.set_auto_hide_delay(delay);
        }
        Ok(s)
    }

    /// Write every setting to `store`.
    pub fn save(&self, store: &dyn PrefsStore) -> prefs::Result<()> {
        store.set_typed(SHOW_NAME_KEY, &self.show_desktop_name)?;
        store.set_typed(AUTO_EXPAND_KEY, &self.auto_expand_on_notch)?;
        store.set_typed(AUTO_HIDE_DELAY_KEY, &self.auto_hide_delay)
    }
}
