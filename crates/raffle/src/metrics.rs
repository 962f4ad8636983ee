use prometheus::{IntCounter, IntGauge, Opts, Registry};

/// Board-level prometheus metrics.
pub struct RaffleMetrics {
    /// Claims that took a free slot.
    pub claims: IntCounter,
    /// Claims that found the slot already taken.
    pub claims_lost: IntCounter,
    /// Administrative releases.
    pub releases: IntCounter,
    /// Administrative resets.
    pub resets: IntCounter,
    /// Rejected administrative credentials.
    pub auth_failures: IntCounter,
    /// Number of taken slots as of the last mutation or full read.
    pub slots_taken: IntGauge,
}

impl RaffleMetrics {
    /// Create metrics and register them with the given prometheus registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self::build()?;

        registry.register(Box::new(metrics.claims.clone()))?;
        registry.register(Box::new(metrics.claims_lost.clone()))?;
        registry.register(Box::new(metrics.releases.clone()))?;
        registry.register(Box::new(metrics.resets.clone()))?;
        registry.register(Box::new(metrics.auth_failures.clone()))?;
        registry.register(Box::new(metrics.slots_taken.clone()))?;

        Ok(metrics)
    }

    /// Create metrics without registering (for testing).
    pub fn unregistered() -> Self {
        Self::build().expect("valid metric names")
    }

    fn build() -> Result<Self, prometheus::Error> {
        Ok(Self {
            claims: IntCounter::with_opts(Opts::new(
                "raffle_claims_total",
                "Claims that took a free slot",
            ))?,
            claims_lost: IntCounter::with_opts(Opts::new(
                "raffle_claims_lost_total",
                "Claims on a slot that was already taken",
            ))?,
            releases: IntCounter::with_opts(Opts::new(
                "raffle_releases_total",
                "Administrative slot releases",
            ))?,
            resets: IntCounter::with_opts(Opts::new(
                "raffle_resets_total",
                "Administrative board resets",
            ))?,
            auth_failures: IntCounter::with_opts(Opts::new(
                "raffle_auth_failures_total",
                "Rejected administrative credentials",
            ))?,
            slots_taken: IntGauge::with_opts(Opts::new(
                "raffle_slots_taken",
                "Number of taken slots",
            ))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_metrics_work() {
        let m = RaffleMetrics::unregistered();
        m.claims.inc();
        m.slots_taken.set(5);
        assert_eq!(m.claims.get(), 1);
        assert_eq!(m.slots_taken.get(), 5);
    }

    #[test]
    fn registered_metrics_work() {
        let r = Registry::new();
        let m = RaffleMetrics::new(&r).unwrap();
        m.resets.inc();
        assert_eq!(m.resets.get(), 1);
        let names: Vec<String> = r.gather().iter().map(|f| f.get_name().to_string()).collect();
        assert!(names.contains(&"raffle_resets_total".to_string()));
    }

    #[test]
    fn double_registration_fails() {
        let r = Registry::new();
        RaffleMetrics::new(&r).unwrap();
        assert!(RaffleMetrics::new(&r).is_err());
    }
}
