//! Process-wide settings, read from the environment once at startup.

use backend_client::BackendConfig;
use call_tools::{CalendarConfig, LiveKitConfig, TransferConfig};

/// Everything the worker reads from the environment.
///
/// Built once with [`Settings::from_env`] and handed to each component;
/// nothing else in the worker reads environment variables.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub backend: BackendConfig,
    pub calendar: CalendarConfig,
    pub livekit: LiveKitConfig,
    pub transfer: TransferConfig,
}

impl Settings {
    /// Read all settings from environment variables.
    ///
    /// - `API_URL`, `API_SECRET_KEY` - backend
    /// - `GOOGLE_APPLICATION_CREDENTIALS`, `GOOGLE_CALENDAR_ID` - calendar
    /// - `LIVEKIT_URL`, `LIVEKIT_API_KEY`, `LIVEKIT_API_SECRET` - server API
    /// - `TRANSFER_TO`, `TRANSFER_PLAY_DIALTONE` - call forwarding
    ///
    /// Missing values never fail here; the features that need them degrade.
    pub fn from_env() -> Self {
        Self {
            backend: BackendConfig::from_env(),
            calendar: CalendarConfig::from_env(),
            livekit: LiveKitConfig::from_env(),
            transfer: TransferConfig::from_env(),
        }
    }

    /// Replace the backend settings.
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the calendar settings.
    pub fn with_calendar(mut self, calendar: CalendarConfig) -> Self {
        self.calendar = calendar;
        self
    }

    /// Replace the LiveKit credentials.
    pub fn with_livekit(mut self, livekit: LiveKitConfig) -> Self {
        self.livekit = livekit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env var tests must not run concurrently.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 9] = [
        "API_URL",
        "API_SECRET_KEY",
        "GOOGLE_APPLICATION_CREDENTIALS",
        "GOOGLE_CALENDAR_ID",
        "LIVEKIT_URL",
        "LIVEKIT_API_KEY",
        "LIVEKIT_API_SECRET",
        "TRANSFER_TO",
        "TRANSFER_PLAY_DIALTONE",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_from_empty_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();

        let settings = Settings::from_env();
        assert_eq!(settings.backend.base_url, "http://127.0.0.1:8000");
        assert!(!settings.backend.has_secret());
        assert!(settings.calendar.credentials_path.is_none());
        assert_eq!(settings.calendar.calendar_id, "primary");
        assert!(!settings.livekit.is_configured());
        assert_eq!(settings.transfer.destination, "tel:+12894898478");
        assert!(!settings.transfer.play_dialtone);
    }

    #[test]
    fn test_full_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();
        env::set_var("API_URL", "https://backend.example.com/");
        env::set_var("API_SECRET_KEY", "s3cret");
        env::set_var("GOOGLE_CALENDAR_ID", "clinic@example.com");
        env::set_var("LIVEKIT_URL", "wss://voice.example.com");
        env::set_var("LIVEKIT_API_KEY", "APIkey");
        env::set_var("LIVEKIT_API_SECRET", "lk-secret");

        let settings = Settings::from_env();
        assert_eq!(settings.backend.base_url, "https://backend.example.com");
        assert_eq!(settings.backend.secret.as_deref(), Some("s3cret"));
        assert_eq!(settings.calendar.calendar_id, "clinic@example.com");
        assert!(settings.livekit.is_configured());

        let debug = format!("{:?}", settings);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("lk-secret"));

        clear();
    }
}
