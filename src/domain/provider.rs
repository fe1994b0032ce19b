use {
    super::error::StoreError,
    super::id::OrderId,
    super::order::Order,
    std::{future::Future, pin::Pin},
};

/// Single-shot order fetch against the backend resource endpoint.
///
/// Implementations carry no retry logic; retry policy belongs to the
/// confirmation poller. Object-safe so callers can hold an
/// `Arc<dyn OrderProvider>` across task boundaries.
pub trait OrderProvider: Send + Sync {
    fn fetch_order(
        &self,
        id: &OrderId,
    ) -> Pin<Box<dyn Future<Output = Result<Order, StoreError>> + Send + '_>>;
}
