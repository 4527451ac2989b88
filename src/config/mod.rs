//! Configuration management for PagolaTerm
//!
//! Timings, the redirect target and the prompt identities of the three
//! consoles. Every default matches the live portfolio, so
//! running without a config file is the normal case.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure for PagolaTerm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Prompt identities
    pub profile: ProfileConfig,

    /// Scheduler delays
    pub timing: TimingConfig,

    /// Countdown-then-redirect behaviour
    pub redirect: RedirectConfig,
}

impl Config {
    /// Check that the configuration can drive a session
    pub fn validate(&self) -> Result<()> {
        if self.profile.boot_prompt.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "profile.boot_prompt".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.profile.welcome_prompt.trim().is_empty() {
            return Err(Error::ConfigValidationFailed {
                field: "profile.welcome_prompt".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if !(1..=MAX_COUNTDOWN).contains(&self.redirect.countdown) {
            return Err(Error::ConfigValidationFailed {
                field: "redirect.countdown".to_string(),
                reason: format!("must be between 1 and {}", MAX_COUNTDOWN),
            });
        }

        let url_pattern = regex::Regex::new(r"^https?://\S+$")?;
        if !url_pattern.is_match(&self.redirect.url) {
            return Err(Error::ConfigValidationFailed {
                field: "redirect.url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.redirect.url),
            });
        }

        if self.timing.countdown_interval_ms == 0 {
            return Err(Error::ConfigValidationFailed {
                field: "timing.countdown_interval_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Longest countdown accepted by validation
pub const MAX_COUNTDOWN: u32 = 10;

/// Prompt identities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Prompt echoed before commands in the boot console
    pub boot_prompt: String,

    /// Prompt echoed before commands in the welcome console
    pub welcome_prompt: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            boot_prompt: "visitor@pagola:~$".to_string(),
            welcome_prompt: "root@pagola:~$".to_string(),
        }
    }
}

/// Scheduler delays in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Multiplier applied to the boot script delays, in percent
    pub boot_speed_percent: u32,

    /// Gap between countdown lines
    pub countdown_interval_ms: u64,

    /// Gap between the success line and navigation
    pub redirect_delay_ms: u64,

    /// Gap between `start` and the screen transition
    pub launch_delay_ms: u64,

    /// Gap between Run and the program prompt
    pub program_start_ms: u64,

    /// Gap between an answer and the program's reply
    pub thinking_ms: u64,
}

impl TimingConfig {
    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }

    pub fn program_start(&self) -> Duration {
        Duration::from_millis(self.program_start_ms)
    }

    pub fn thinking(&self) -> Duration {
        Duration::from_millis(self.thinking_ms)
    }

    /// Scale a boot script delay by `boot_speed_percent`
    pub fn boot_delay(&self, ms: u64) -> Duration {
        Duration::from_millis(ms * u64::from(self.boot_speed_percent) / 100)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            boot_speed_percent: 100,
            countdown_interval_ms: 1000,
            redirect_delay_ms: 1000,
            launch_delay_ms: 1000,
            program_start_ms: 800,
            thinking_ms: 800,
        }
    }
}

/// Countdown-then-redirect behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    /// External URL handed to the host bridge
    pub url: String,

    /// Number of "Redirigiendo en K..." lines
    pub countdown: u32,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/Paagola".to_string(),
            countdown: 3,
        }
    }
}
