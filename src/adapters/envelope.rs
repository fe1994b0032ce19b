use {crate::domain::order::Order, serde_json::Value};

/// Field names a gateway payment object may carry its redirect URL
/// under. Backends have shipped all of these at one point or another.
const PAYMENT_URL_KEYS: [&str; 8] = [
    "url",
    "paymentUrl",
    "redirectUrl",
    "checkoutUrl",
    "Url",
    "PaymentUrl",
    "RedirectUrl",
    "CheckoutUrl",
];

/// Raw reply from `POST /orders`.
///
/// Depending on the payment method the backend answers with either a
/// plain order or an envelope wrapping the order plus a gateway payment
/// object, so extraction stays defensive over the untyped JSON.
#[derive(Debug, Clone)]
pub struct CheckoutResponse(Value);

impl CheckoutResponse {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// The created order's identifier: a top-level `id`, or the `id` of
    /// a nested `order` object.
    pub fn order_id(&self) -> Option<&str> {
        if let Some(id) = self.0.get("id").and_then(Value::as_str) {
            return Some(id);
        }
        self.0
            .get("order")
            .and_then(|o| o.get("id"))
            .and_then(Value::as_str)
    }

    /// Gateway redirect URL, if the reply carries a payment object with
    /// one. A present URL means the gateway flow: redirect first, poll
    /// for confirmation after the user comes back.
    pub fn payment_url(&self) -> Option<&str> {
        let payment = self.0.get("payment")?;
        PAYMENT_URL_KEYS
            .iter()
            .find_map(|key| payment.get(key).and_then(Value::as_str))
    }

    /// The nested or top-level order representation, when it parses.
    pub fn order(&self) -> Option<Order> {
        let candidate = self.0.get("order").unwrap_or(&self.0);
        serde_json::from_value(candidate.clone()).ok()
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}
