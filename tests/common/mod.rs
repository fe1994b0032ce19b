#![allow(dead_code)]

use {
    pay_watch::domain::{
        error::StoreError,
        id::OrderId,
        order::{Order, OrderStatus},
        provider::OrderProvider,
    },
    std::{
        future::Future,
        pin::Pin,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    },
    tokio::sync::Notify,
};

/// One scripted backend reply.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Status(OrderStatus),
    Error,
}

/// In-process `OrderProvider` double. Plays back a script of replies in
/// order, counts calls, records which ids were fetched, and pings
/// `on_call` so tests can synchronize on "the poller has fetched"
/// without sleeping. An exhausted script keeps answering `pending`.
pub struct ScriptedProvider {
    script: Mutex<Vec<Step>>,
    calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
    pub on_call: Notify,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
            fetched: Mutex::new(Vec::new()),
            on_call: Notify::new(),
        })
    }

    /// A backend that never resolves: every reply is `pending`.
    pub fn pending_forever() -> Arc<Self> {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fetched_ids(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl OrderProvider for ScriptedProvider {
    fn fetch_order(
        &self,
        id: &OrderId,
    ) -> Pin<Box<dyn Future<Output = Result<Order, StoreError>> + Send + '_>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(id.as_str().to_string());
        let step = self
            .script
            .lock()
            .unwrap()
            .get(call)
            .copied()
            .unwrap_or(Step::Status(OrderStatus::Pending));
        self.on_call.notify_one();

        let id = id.clone();
        Box::pin(async move {
            match step {
                Step::Status(status) => Ok(make_order(id.as_str(), status)),
                Step::Error => Err(StoreError::Problem("injected backend failure".into())),
            }
        })
    }
}

pub fn make_order(id: &str, status: OrderStatus) -> Order {
    Order {
        id: id.to_string(),
        status,
        total_amount: 50.0,
        items: Vec::new(),
        created_at: None,
    }
}

pub fn order_id(id: &str) -> OrderId {
    OrderId::new(id).unwrap()
}
