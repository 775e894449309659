//! Portal configuration loaded via OrthoConfig.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_SLOT_KEY;
use crate::outbound::fixtures::FixtureLatency;

const DEFAULT_SLOT_DIR: &str = ".portal";

/// Configuration for the session slot and fixture collaborators.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Run as a non-interactive rendering context: no durable slot, every
    /// process starts logged out.
    #[ortho_config(default = false)]
    pub headless: bool,
    /// Directory backing the durable session slot.
    pub slot_dir: Option<PathBuf>,
    /// Key the session occupies in the slot.
    pub slot_key: Option<String>,
    /// Uniform simulated latency for fixture services, in milliseconds.
    pub latency_ms: Option<u64>,
    /// Let the fixture exchange enrol unknown emails on login.
    #[ortho_config(default = false)]
    pub open_enrolment: bool,
}

impl PortalSettings {
    /// Return the configured slot directory, falling back to the default.
    pub fn slot_dir(&self) -> PathBuf {
        self.slot_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SLOT_DIR))
    }

    /// Return the configured slot key, falling back to the default.
    pub fn slot_key(&self) -> &str {
        self.slot_key.as_deref().unwrap_or(DEFAULT_SLOT_KEY)
    }

    /// Latency profile for fixture services.
    pub fn latency(&self) -> FixtureLatency {
        self.latency_ms
            .map(|ms| FixtureLatency::uniform(Duration::from_millis(ms)))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for portal configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "PORTAL_HEADLESS",
        "PORTAL_SLOT_DIR",
        "PORTAL_SLOT_KEY",
        "PORTAL_LATENCY_MS",
        "PORTAL_OPEN_ENROLMENT",
    ];

    fn load_from_empty_args() -> PortalSettings {
        PortalSettings::load_from_iter([OsString::from("portal")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|var| (var, None::<String>)));

        let settings = load_from_empty_args();
        assert!(!settings.headless);
        assert!(!settings.open_enrolment);
        assert_eq!(settings.slot_dir(), PathBuf::from(".portal"));
        assert_eq!(settings.slot_key(), "nado_user");
        assert_eq!(settings.latency(), FixtureLatency::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("PORTAL_HEADLESS", Some("true".to_owned())),
            ("PORTAL_SLOT_DIR", Some("/tmp/portal-slot".to_owned())),
            ("PORTAL_SLOT_KEY", Some("alt_user".to_owned())),
            ("PORTAL_LATENCY_MS", Some("0".to_owned())),
            ("PORTAL_OPEN_ENROLMENT", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.headless);
        assert!(settings.open_enrolment);
        assert_eq!(settings.slot_dir(), PathBuf::from("/tmp/portal-slot"));
        assert_eq!(settings.slot_key(), "alt_user");
        assert_eq!(settings.latency(), FixtureLatency::uniform(Duration::ZERO));
    }
}
