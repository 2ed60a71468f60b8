/// Current UTC timestamp in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate an order ID: `ORD-<millis>-<4 hex chars>`.
///
/// Timestamp prefix keeps IDs sortable by creation time; the random suffix
/// makes collisions within the same millisecond vanishingly unlikely at
/// storefront scale.
pub fn order_id() -> String {
    use rand::Rng;
    let suffix: u16 = rand::thread_rng().gen_range(0..=u16::MAX);
    format!("ORD-{}-{:04x}", now_millis(), suffix)
}

/// Generate a bank-transfer payment reference: `PAY-<millis>-<4 hex chars>`.
///
/// Quoted by the customer when making the out-of-band transfer and matched
/// by the payment-status endpoint.
pub fn payment_reference() -> String {
    use rand::Rng;
    let suffix: u16 = rand::thread_rng().gen_range(0..=u16::MAX);
    format!("PAY-{}-{:04x}", now_millis(), suffix)
}
