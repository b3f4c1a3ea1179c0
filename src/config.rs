use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveTime;
use dotenvy::dotenv;

use crate::attendance::EngineSettings;
use crate::attendance::clock::ReferenceClock;
use crate::utils::retry::RetryPolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Attendance engine
    /// minutes east of UTC; 420 = WIB (Asia/Jakarta)
    pub reference_utc_offset_minutes: i32,
    pub late_grace_minutes: i64,
    pub sweep_at: NaiveTime,
    pub sweep_alfa_verified: bool,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow!("{key}={raw:?} is invalid: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let sweep_at = env::var("SWEEP_AT").unwrap_or_else(|_| "10:00".to_string());

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            reference_utc_offset_minutes: parsed_or("REFERENCE_UTC_OFFSET_MINUTES", "420")?,
            late_grace_minutes: parsed_or("LATE_GRACE_MINUTES", "15")?, // default 15 min
            sweep_at: NaiveTime::parse_from_str(&sweep_at, "%H:%M")
                .with_context(|| format!("SWEEP_AT={sweep_at:?} must be HH:MM"))?,
            sweep_alfa_verified: parsed_or("SWEEP_ALFA_VERIFIED", "false")?,
            retry_attempts: parsed_or("RETRY_ATTEMPTS", "3")?,
            retry_backoff_ms: parsed_or("RETRY_BACKOFF_MS", "50")?,
        })
    }

    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let clock = ReferenceClock::from_offset_minutes(self.reference_utc_offset_minutes)
            .ok_or_else(|| {
                anyhow!(
                    "REFERENCE_UTC_OFFSET_MINUTES={} is out of range",
                    self.reference_utc_offset_minutes
                )
            })?;

        if self.late_grace_minutes < 0 {
            return Err(anyhow!("LATE_GRACE_MINUTES cannot be negative"));
        }

        Ok(EngineSettings {
            clock,
            late_grace: chrono::Duration::minutes(self.late_grace_minutes),
            sweep_alfa_verified: self.sweep_alfa_verified,
            retry: RetryPolicy {
                attempts: self.retry_attempts.max(1),
                backoff: Duration::from_millis(self.retry_backoff_ms),
            },
        })
    }
}
