use {
    crate::services::poller::PollPolicy,
    std::{env, fmt::Display, str::FromStr, time::Duration},
    tracing::info,
};

/// Environment-derived settings. `STORE_API_BASE` is the only required
/// variable; the poll budget falls back to the checkout default of
/// 60 attempts at 3000 ms.
pub struct Config {
    pub api_base: String,
    pub api_token: Option<String>,
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Config {
    pub fn load() -> Self {
        Self {
            api_base: env::var("STORE_API_BASE")
                .expect("STORE_API_BASE must be set, e.g. http://localhost:5000/api"),
            api_token: env::var("STORE_API_TOKEN").ok(),
            max_attempts: try_load("PAYMENT_POLL_ATTEMPTS", "60"),
            poll_interval: Duration::from_millis(try_load("PAYMENT_POLL_INTERVAL_MS", "3000")),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.max_attempts,
            interval: self.poll_interval,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .unwrap_or_else(|e| panic!("invalid {key} value: {e}"))
}
