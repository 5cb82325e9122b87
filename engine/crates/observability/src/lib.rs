use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[derive(Debug, Clone)]
pub struct TickMetrics {
    pub tick_number: u64,
    pub duration_us: u128,
    /// Time available for one tick at the configured rate.
    pub budget_us: u128,
    /// Sessions reconciled during this tick.
    pub session_count: usize,
}

impl TickMetrics {
    pub fn over_budget(&self) -> bool {
        self.duration_us > self.budget_us
    }

    pub fn log(&self) {
        if self.over_budget() {
            tracing::warn!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                sessions = self.session_count,
                "tick exceeded budget ({}us > {}us)",
                self.duration_us,
                self.budget_us
            );
        } else {
            tracing::debug!(
                tick = self.tick_number,
                duration_us = self.duration_us,
                sessions = self.session_count,
                "tick completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_check() {
        let mut metrics = TickMetrics {
            tick_number: 1,
            duration_us: 10,
            budget_us: 50_000,
            session_count: 0,
        };
        assert!(!metrics.over_budget());
        metrics.duration_us = 50_001;
        assert!(metrics.over_budget());
    }
}
