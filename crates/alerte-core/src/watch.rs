//! Watch-mode safety toggles.

use serde::{Deserialize, Serialize};

use crate::settings_store::SettingsStore;

const WATCH_SETTINGS_KEY: &str = "watch.settings";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSettings {
    pub audio_recording: bool,
    pub video_recording: bool,
    pub accident_detection: bool,
    pub shake_detection: bool,
    pub geofencing: bool,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            audio_recording: false,
            video_recording: false,
            accident_detection: true,
            shake_detection: true,
            geofencing: false,
        }
    }
}

impl WatchSettings {
    /// Video capture rides on the audio pipeline: enabling video turns audio
    /// on as well.
    pub fn set_video_recording(&mut self, enabled: bool) {
        self.video_recording = enabled;
        if enabled {
            self.audio_recording = true;
        }
    }

    /// Disabling audio takes video recording down with it.
    pub fn set_audio_recording(&mut self, enabled: bool) {
        self.audio_recording = enabled;
        if !enabled {
            self.video_recording = false;
        }
    }
}

pub fn load_watch_settings(store: &SettingsStore) -> WatchSettings {
    store
        .get_string(WATCH_SETTINGS_KEY)
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_watch_settings(store: &SettingsStore, settings: &WatchSettings) -> anyhow::Result<()> {
    store.set_string(WATCH_SETTINGS_KEY, &serde_json::to_string(settings)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_pulls_audio_in() {
        let mut settings = WatchSettings::default();
        assert!(!settings.audio_recording);

        settings.set_video_recording(true);
        assert!(settings.video_recording);
        assert!(settings.audio_recording);

        // Turning video off leaves audio as the user set it.
        settings.set_video_recording(false);
        assert!(settings.audio_recording);
    }

    #[test]
    fn dropping_audio_drops_video() {
        let mut settings = WatchSettings::default();
        settings.set_video_recording(true);

        settings.set_audio_recording(false);
        assert!(!settings.audio_recording);
        assert!(!settings.video_recording);
    }

    #[test]
    fn settings_roundtrip_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json"));

        assert_eq!(load_watch_settings(&store), WatchSettings::default());

        let mut settings = WatchSettings::default();
        settings.set_video_recording(true);
        settings.geofencing = true;
        save_watch_settings(&store, &settings).unwrap();

        assert_eq!(load_watch_settings(&store), settings);
    }
}
