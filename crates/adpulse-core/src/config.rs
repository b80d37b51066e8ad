#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Length of the trailing window used when a request names no dates.
    pub default_window_days: u32,
    /// Longest window a request may ask for.
    pub max_window_days: u32,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            default_window_days: 30,
            max_window_days: 365,
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let cfg = Self {
            port: std::env::var("ADPULSE_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            default_window_days: std::env::var("ADPULSE_DEFAULT_WINDOW_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|e| format!("invalid default window: {e}"))?,
            max_window_days: std::env::var("ADPULSE_MAX_WINDOW_DAYS")
                .unwrap_or_else(|_| "365".to_string())
                .parse()
                .unwrap_or(365),
            cors_origins: std::env::var("ADPULSE_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.default_window_days == 0 || self.max_window_days == 0 {
            return Err("window lengths must be at least one day".to_string());
        }
        if self.default_window_days > self.max_window_days {
            return Err(format!(
                "default window ({} days) exceeds max window ({} days)",
                self.default_window_days, self.max_window_days
            ));
        }
        Ok(())
    }
}
