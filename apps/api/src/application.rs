//! Use-case services of the application layer

use std::sync::Arc;

use chrono::NaiveDate;
use rym_core::{CoreResult, ServiceCollection};

/// Source of the current calendar date for service records
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local date of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Register the application layer's services
pub fn add_application(services: &mut ServiceCollection) -> CoreResult<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    services.add_singleton(clock);
    tracing::debug!("Application services registered");
    Ok(())
}
