use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // SETTLEMENT METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Total number of settlements committed
    pub static ref SETTLEMENTS_COMPLETED: IntCounter = register_int_counter!(
        "multiswap_settlements_completed_total",
        "Total number of settlements committed"
    )
    .unwrap();

    /// Rejected settlements by error kind
    pub static ref SETTLEMENTS_REJECTED: IntCounterVec = register_int_counter_vec!(
        "multiswap_settlements_rejected_total",
        "Total settlements rejected by error kind",
        &["kind"]
    )
    .unwrap();

    /// Rejected settlements by error category
    pub static ref SETTLEMENT_REJECTION_CATEGORY: IntCounterVec = register_int_counter_vec!(
        "multiswap_settlement_rejection_category_total",
        "Total settlements rejected by error category",
        &["category"]
    )
    .unwrap();

    /// Total number of input legs executed in committed settlements
    pub static ref LEGS_EXECUTED: IntCounter = register_int_counter!(
        "multiswap_legs_executed_total",
        "Total input legs executed in committed settlements"
    )
    .unwrap();

    /// Legs per committed settlement
    pub static ref LEGS_PER_SETTLEMENT: Histogram = register_histogram!(
        "multiswap_legs_per_settlement",
        "Number of input legs per committed settlement",
        vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // FEE METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Settlements that paid a non-zero protocol fee
    pub static ref FEES_COLLECTED: IntCounter = register_int_counter!(
        "multiswap_fees_collected_total",
        "Total settlements that paid a protocol fee"
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // ADMIN METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Applied admin actions by event name
    pub static ref ADMIN_ACTIONS: IntCounterVec = register_int_counter_vec!(
        "multiswap_admin_actions_total",
        "Total admin actions applied by action",
        &["action"]
    )
    .unwrap();

    /// Whether settlement is paused (1) or live (0)
    pub static ref ENGINE_PAUSED: IntGauge = register_int_gauge!(
        "multiswap_engine_paused",
        "Whether settlement is paused"
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // LOG METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Warning and error log events by level
    pub static ref LOG_EVENTS: IntCounterVec = register_int_counter_vec!(
        "multiswap_log_events_total",
        "Total warning and error log events by level",
        &["level"]
    )
    .unwrap();
}
