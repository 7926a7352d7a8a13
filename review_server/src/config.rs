use std::env;

use chat_tools::ChatConfig;
use log::*;
use merchant_tools::MerchantConfig;
use rvg_common::parse_boolean_flag;

const DEFAULT_INGEST_INTERVAL_SECS: u64 = 3600;
const DEFAULT_DISPATCH_INTERVAL_SECS: u64 = 900;
const DEFAULT_DISPATCH_START_HOUR: u8 = 9;
const DEFAULT_DISPATCH_END_HOUR: u8 = 21;
const DEFAULT_BATCH_LIMIT: u32 = 50;
const DEFAULT_MAX_FETCH_SPAN_DAYS: i64 = 100;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    /// Seconds between ingestion runs. Each run pulls the last 24 h of completed orders.
    pub ingest_interval_secs: u64,
    /// Seconds between scheduled dispatch runs.
    pub dispatch_interval_secs: u64,
    /// Daily window during which scheduled (not manual) dispatch is permitted.
    pub dispatch_start_hour: u8,
    pub dispatch_end_hour: u8,
    /// Hard cap on orders per dispatch batch, scheduled or manual.
    pub max_batch_limit: u32,
    /// Hard cap on the span of a manual ingestion request.
    pub max_fetch_span_days: i64,
    /// Optional named gateway template for review requests; freeform text is used when unset.
    pub message_template: Option<String>,
    /// Probe the messaging-gateway instance state at startup. On by default; switch off for environments
    /// where the gateway is provisioned after the server starts.
    pub chat_health_check: bool,
    pub merchant_config: MerchantConfig,
    pub chat_config: ChatConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: String::default(),
            ingest_interval_secs: DEFAULT_INGEST_INTERVAL_SECS,
            dispatch_interval_secs: DEFAULT_DISPATCH_INTERVAL_SECS,
            dispatch_start_hour: DEFAULT_DISPATCH_START_HOUR,
            dispatch_end_hour: DEFAULT_DISPATCH_END_HOUR,
            max_batch_limit: DEFAULT_BATCH_LIMIT,
            max_fetch_span_days: DEFAULT_MAX_FETCH_SPAN_DAYS,
            message_template: None,
            chat_health_check: true,
            merchant_config: MerchantConfig::default(),
            chat_config: ChatConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("RVG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ RVG_DATABASE_URL is not set. Please set it to the URL for the review gateway database.");
            String::default()
        });
        let ingest_interval_secs = env_u64("RVG_INGEST_INTERVAL_SECS", DEFAULT_INGEST_INTERVAL_SECS);
        let dispatch_interval_secs = env_u64("RVG_DISPATCH_INTERVAL_SECS", DEFAULT_DISPATCH_INTERVAL_SECS);
        let dispatch_start_hour = env_u8("RVG_DISPATCH_START_HOUR", DEFAULT_DISPATCH_START_HOUR);
        let dispatch_end_hour = env_u8("RVG_DISPATCH_END_HOUR", DEFAULT_DISPATCH_END_HOUR);
        let max_batch_limit = env_u64("RVG_MAX_BATCH_LIMIT", u64::from(DEFAULT_BATCH_LIMIT)) as u32;
        let max_fetch_span_days = env_u64("RVG_MAX_FETCH_SPAN_DAYS", DEFAULT_MAX_FETCH_SPAN_DAYS as u64) as i64;
        let message_template = env::var("RVG_MESSAGE_TEMPLATE").ok().filter(|s| !s.is_empty());
        let chat_health_check = parse_boolean_flag(env::var("RVG_CHAT_HEALTH_CHECK").ok(), true);
        let merchant_config = MerchantConfig::new_from_env_or_default();
        let chat_config = ChatConfig::new_from_env_or_default();
        Self {
            database_url,
            ingest_interval_secs,
            dispatch_interval_secs,
            dispatch_start_hour,
            dispatch_end_hour,
            max_batch_limit,
            max_fetch_span_days,
            message_template,
            chat_health_check,
            merchant_config,
            chat_config,
        }
    }
}

fn env_u64(var: &str, default: u64) -> u64 {
    env::var(var)
        .map(|s| {
            s.parse::<u64>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
                default
            })
        })
        .ok()
        .unwrap_or(default)
}

fn env_u8(var: &str, default: u8) -> u8 {
    env::var(var)
        .map(|s| {
            s.parse::<u8>().unwrap_or_else(|e| {
                error!("🪛️ {s} is not a valid value for {var}. {e} Using the default, {default}, instead.");
                default
            })
        })
        .ok()
        .unwrap_or(default)
}
