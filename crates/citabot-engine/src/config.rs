use crate::wait::WaitPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Which cardiology sub-consultation to book. The data values come from the
/// service catalog on the appointment page (parent service 1450).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Consultation {
    PrimeraVez,
    PrimeraVezPediatrica,
    #[default]
    Control,
    ControlPediatrica,
}

impl Consultation {
    pub fn data_value(&self) -> &'static str {
        match self {
            Consultation::PrimeraVez => "1510",
            Consultation::PrimeraVezPediatrica => "3443",
            Consultation::Control => "1511",
            Consultation::ControlPediatrica => "3444",
        }
    }
}

impl fmt::Display for Consultation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Consultation::PrimeraVez => "primera-vez",
            Consultation::PrimeraVezPediatrica => "primera-vez-pediatrica",
            Consultation::Control => "control",
            Consultation::ControlPediatrica => "control-pediatrica",
        };
        f.write_str(name)
    }
}

impl FromStr for Consultation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primera-vez" => Ok(Consultation::PrimeraVez),
            "primera-vez-pediatrica" => Ok(Consultation::PrimeraVezPediatrica),
            "control" => Ok(Consultation::Control),
            "control-pediatrica" => Ok(Consultation::ControlPediatrica),
            other => Err(format!(
                "unknown consultation type '{other}' (expected primera-vez, \
                 primera-vez-pediatrica, control or control-pediatrica)"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub url: String,
    /// Tried in order when the form markers are missing at the primary URL.
    pub fallback_urls: Vec<String>,
    pub consultation: Consultation,
    pub city: String,
    pub professional: String,
    /// Wait budget per selector candidate within a step.
    pub step_timeout_secs: u64,
    /// Wait budget for late-appearing sections (location, professional).
    pub section_timeout_secs: u64,
    /// Wait budget for page readiness after navigation.
    pub ready_timeout_secs: u64,
    /// Short budget for marker probes during frame scouting.
    pub probe_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            url: "https://institutodelcorazon.org/solicitar-cita/".into(),
            fallback_urls: vec![
                "https://institutodelcorazon.org/solicitar-cita/?refresh=1".into(),
                "https://institutodelcorazon.org/".into(),
                "https://www.institutodelcorazon.org/solicitar-cita/".into(),
            ],
            consultation: Consultation::default(),
            city: "Medellín".into(),
            professional: "Cualquier profesional".into(),
            step_timeout_secs: 10,
            section_timeout_secs: 30,
            ready_timeout_secs: 20,
            probe_timeout_secs: 2,
            poll_interval_ms: 500,
        }
    }
}

impl BookingConfig {
    pub fn candidate_urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.url.as_str()).chain(self.fallback_urls.iter().map(String::as_str))
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn step_policy(&self) -> WaitPolicy {
        WaitPolicy::new(Duration::from_secs(self.step_timeout_secs), self.interval())
    }

    pub fn section_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.section_timeout_secs),
            self.interval(),
        )
    }

    pub fn ready_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.ready_timeout_secs),
            self.interval(),
        )
    }

    pub fn probe_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_secs(self.probe_timeout_secs),
            self.interval(),
        )
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./citabot.yaml
    /// 2. ~/.citabot/config.yaml
    /// 3. Built-in defaults
    pub async fn load_default() -> Result<BookingConfig, ConfigError> {
        let local_config = PathBuf::from("./citabot.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".citabot").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(BookingConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<BookingConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: BookingConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consultation_round_trips_through_str() {
        for c in [
            Consultation::PrimeraVez,
            Consultation::PrimeraVezPediatrica,
            Consultation::Control,
            Consultation::ControlPediatrica,
        ] {
            assert_eq!(c.to_string().parse::<Consultation>(), Ok(c));
        }
        assert!("cirugia".parse::<Consultation>().is_err());
    }

    #[test]
    fn default_config_targets_the_booking_page() {
        let config = BookingConfig::default();
        assert!(config.url.contains("solicitar-cita"));
        assert_eq!(config.consultation.data_value(), "1511");
        assert_eq!(config.candidate_urls().count(), 4);
    }

    #[test]
    fn partial_yaml_keeps_defaults_for_the_rest() {
        let config: BookingConfig =
            serde_yaml::from_str("consultation: primera-vez\ncity: Bogotá\n").unwrap();
        assert_eq!(config.consultation, Consultation::PrimeraVez);
        assert_eq!(config.city, "Bogotá");
        assert_eq!(config.professional, "Cualquier profesional");
    }
}
