//! Per-user request throttling
//!
//! Each user id gets its own token bucket. The limiter is the only mutable
//! state shared between interactions and is internally synchronized.

use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::{debug, warn};

use crate::config::ThrottleConfig;
use crate::utils::errors::{Result, ShopError};

pub struct ThrottleMiddleware {
    limiter: DefaultKeyedRateLimiter<i64>,
    admin_exempt: bool,
    admin_ids: Vec<i64>,
}

impl ThrottleMiddleware {
    pub fn new(config: &ThrottleConfig, admin_ids: Vec<i64>) -> Result<Self> {
        let per_minute = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            ShopError::Config("Requests per minute must be greater than 0".to_string())
        })?;
        let burst = NonZeroU32::new(config.burst).unwrap_or(per_minute);

        Ok(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute).allow_burst(burst)),
            admin_exempt: config.admin_exempt,
            admin_ids,
        })
    }

    /// Take one request from the user's bucket
    pub fn check(&self, telegram_id: i64) -> Result<()> {
        if self.admin_exempt && self.admin_ids.contains(&telegram_id) {
            debug!(user_id = telegram_id, "Admin user exempt from throttling");
            return Ok(());
        }

        match self.limiter.check_key(&telegram_id) {
            Ok(()) => Ok(()),
            Err(_) => {
                warn!(user_id = telegram_id, "Request throttled");
                Err(ShopError::RateLimitExceeded)
            }
        }
    }

    /// Drop buckets of users that have been idle long enough to be full again
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}
