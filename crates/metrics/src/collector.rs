use cosmwasm_std::Addr;
use multiswap_settlement::{ErrorCategory, SettlementError, SettlementObserver};
use multiswap_types::{EngineEvent, SettlementOutcome};
use prometheus::{Encoder, TextEncoder};
use tracing::Level;

use crate::metrics::*;

/// Metrics collector for the multiswap settlement engine
///
/// Install it on an engine with
/// [`EngineBuilder::observer`](multiswap_settlement::EngineBuilder::observer)
/// and every commit, rejection and admin action is counted.
pub struct MetricsCollector {
    _private: (),
}

impl MetricsCollector {
    /// Create a collector, registering every unlabelled metric at zero
    pub fn new() -> Self {
        lazy_static::initialize(&SETTLEMENTS_COMPLETED);
        lazy_static::initialize(&LEGS_EXECUTED);
        lazy_static::initialize(&LEGS_PER_SETTLEMENT);
        lazy_static::initialize(&FEES_COLLECTED);
        lazy_static::initialize(&ENGINE_PAUSED);
        Self { _private: () }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SETTLEMENT METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record a committed settlement
    pub fn record_settlement(&self, outcome: &SettlementOutcome) {
        SETTLEMENTS_COMPLETED.inc();
        LEGS_EXECUTED.inc_by(outcome.legs.len() as u64);
        LEGS_PER_SETTLEMENT.observe(outcome.legs.len() as f64);
        if !outcome.fee.is_zero() {
            FEES_COLLECTED.inc();
        }
    }

    /// Record a rejected settlement
    pub fn record_rejection(&self, kind: &str, category: ErrorCategory) {
        SETTLEMENTS_REJECTED.with_label_values(&[kind]).inc();
        SETTLEMENT_REJECTION_CATEGORY
            .with_label_values(&[category.as_str()])
            .inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMIN METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record an applied admin action
    pub fn record_admin_action(&self, event: &EngineEvent) {
        ADMIN_ACTIONS.with_label_values(&[event.name()]).inc();
        match event {
            EngineEvent::Paused { .. } => self.set_paused(true),
            EngineEvent::Unpaused { .. } => self.set_paused(false),
            _ => {}
        }
    }

    pub fn set_paused(&self, paused: bool) {
        ENGINE_PAUSED.set(i64::from(paused));
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOG METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Record a log event at `level`
    pub fn record_log_event(&self, level: Level) {
        LOG_EVENTS
            .with_label_values(&[&level.as_str().to_lowercase()])
            .inc();
    }

    /// Export metrics in Prometheus text format
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingError(e.to_string()))
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SettlementObserver for MetricsCollector {
    fn on_settled(&self, outcome: &SettlementOutcome) {
        self.record_settlement(outcome);
    }

    fn on_rejected(&self, _caller: &Addr, error: &SettlementError) {
        self.record_rejection(error.kind(), error.category());
    }

    fn on_admin(&self, event: &EngineEvent) {
        self.record_admin_action(event);
    }
}

/// Metrics error types
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("encoding error: {0}")]
    EncodingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiswap_settlement::mock::{MockInstruction, ScriptedExchange};
    use multiswap_settlement::{AssetLedger, SettlementEngine};
    use multiswap_types::ConversionRequest;
    use cosmwasm_std::Uint128;
    use std::sync::Arc;

    fn engine(collector: Arc<MetricsCollector>) -> SettlementEngine {
        let engine = SettlementEngine::builder("engine", "controller", "treasury")
            .exchange("router", Arc::new(ScriptedExchange::new()))
            .observer(collector)
            .build()
            .unwrap();
        engine
            .with_ledger(|ledger| {
                let (atom, usdc) = (Addr::unchecked("uatom"), Addr::unchecked("uusdc"));
                ledger
                    .mint(&atom, &Addr::unchecked("alice"), Uint128::new(1_000_000))
                    .unwrap();
                ledger.approve(&atom, &Addr::unchecked("alice"), &Addr::unchecked("engine"), Uint128::MAX);
                ledger
                    .mint(&usdc, &Addr::unchecked("router"), Uint128::new(1_000_000))
                    .unwrap();
            })
            .unwrap();
        engine
    }

    fn request(amount_out: u128, min_output: u128) -> ConversionRequest {
        ConversionRequest::builder("router", "uusdc")
            .leg(
                "uatom",
                100_000,
                MockInstruction::swap("uatom", 100_000, "uusdc", amount_out)
                    .to_binary()
                    .unwrap(),
            )
            .min_output(min_output)
            .build()
    }

    #[test]
    fn test_collector_creation() {
        let collector = MetricsCollector::new();
        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("multiswap_settlements_completed_total"));
        assert!(metrics.contains("multiswap_engine_paused"));
    }

    #[test]
    fn test_observer_counts_commits() {
        let collector = Arc::new(MetricsCollector::new());
        let engine = engine(collector.clone());

        let completed = SETTLEMENTS_COMPLETED.get();
        let legs = LEGS_EXECUTED.get();
        let fees = FEES_COLLECTED.get();

        engine
            .settle(&Addr::unchecked("alice"), &request(100_000, 0))
            .unwrap();

        assert!(SETTLEMENTS_COMPLETED.get() > completed);
        assert!(LEGS_EXECUTED.get() > legs);
        assert!(FEES_COLLECTED.get() > fees);

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("multiswap_legs_per_settlement_bucket"));
    }

    #[test]
    fn test_observer_counts_rejections_by_kind() {
        let collector = Arc::new(MetricsCollector::new());
        let engine = engine(collector.clone());

        let slippage = SETTLEMENTS_REJECTED
            .with_label_values(&["insufficient_output"])
            .get();

        assert!(engine
            .settle(&Addr::unchecked("alice"), &request(10, 11))
            .is_err());

        assert!(
            SETTLEMENTS_REJECTED
                .with_label_values(&["insufficient_output"])
                .get()
                > slippage
        );
        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains(r#"category="economic""#));
    }

    #[test]
    fn test_admin_actions_and_pause_gauge() {
        let collector = Arc::new(MetricsCollector::new());
        let engine = engine(collector.clone());
        let controller = Addr::unchecked("controller");

        engine.pause(&controller).unwrap();
        engine.set_fee_rate(&controller, 20).unwrap();

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains(r#"multiswap_admin_actions_total{action="paused"}"#));
        assert!(metrics.contains(r#"action="fee_rate_updated""#));
    }

    #[test]
    fn test_record_log_event() {
        let collector = MetricsCollector::new();
        collector.record_log_event(Level::ERROR);

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains(r#"multiswap_log_events_total{level="error"}"#));
    }
}
