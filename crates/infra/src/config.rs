use pitchin_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret key required on the admin trigger routes
    pub admin_api_key: String,
    /// Port for the application to run on
    pub port: usize,
    /// UTC hour of day at which the daily reminder runs fire
    pub reminder_run_hour_utc: u32,
    /// Base url of the transactional mail API. When absent no emails
    /// are delivered, which is what you want in local development.
    pub mailer_api_url: Option<String>,
    /// Api key for the transactional mail API
    pub mailer_api_key: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        let admin_api_key = match std::env::var("ADMIN_API_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find ADMIN_API_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!(
                    "Admin api key for triggering reminder runs was generated and set to: {}",
                    key
                );
                key
            }
        };

        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or(default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let default_run_hour = "7";
        let run_hour = std::env::var("REMINDER_RUN_HOUR_UTC").unwrap_or(default_run_hour.into());
        let reminder_run_hour_utc = match run_hour.parse::<u32>() {
            Ok(hour) if hour < 24 => hour,
            _ => {
                warn!(
                    "The given REMINDER_RUN_HOUR_UTC: {} is not a valid hour, falling back to: {}.",
                    run_hour, default_run_hour
                );
                default_run_hour.parse::<u32>().unwrap()
            }
        };

        let mailer_api_url = std::env::var("MAILER_API_URL").ok();
        let mailer_api_key = std::env::var("MAILER_API_KEY").ok();
        if mailer_api_url.is_none() {
            info!("Did not find MAILER_API_URL environment variable. Emails will not be delivered.");
        }

        Self {
            admin_api_key,
            port,
            reminder_run_hour_utc,
            mailer_api_url,
            mailer_api_key,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
