use {
    clap::{Parser, Subcommand},
    pay_watch::{
        adapters::rest::{CheckoutRequest, StoreApi},
        config::Config,
        domain::{error::StoreError, id::OrderId},
        services::{
            poller::{PollOutcome, PollPolicy},
            reconciler::{ReconcileState, Reconciler},
        },
    },
    std::{process::ExitCode, sync::Arc},
    tokio::signal,
};

#[derive(Parser)]
#[command(
    name = "pay_watch",
    about = "Watch a storefront order until its payment settles"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll an existing order until it settles or the budget runs out.
    Watch {
        /// Order reference returned at checkout.
        order_id: String,
    },
    /// Create an order from the current cart, then watch it settle.
    Checkout {
        /// Payment method: "simulate" settles synchronously through the
        /// backend, anything else goes through a gateway redirect.
        #[arg(long, default_value = "simulate")]
        method: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load();

    let api = match StoreApi::new(&config.api_base, config.api_token.clone()) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let order_id = match cli.command {
        Command::Watch { order_id } => match OrderId::new(order_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "bad order id");
                return ExitCode::FAILURE;
            }
        },
        Command::Checkout { method } => match checkout(&api, &method).await {
            Ok(Some(id)) => id,
            Ok(None) => return ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "checkout failed");
                return ExitCode::FAILURE;
            }
        },
    };

    watch_order(api, order_id, config.poll_policy()).await
}

/// Place the order. For the gateway flow the user finishes payment in
/// the browser while we wait for the backend to hear about it; simulate
/// settles synchronously and the watch below confirms it.
async fn checkout(api: &StoreApi, method: &str) -> Result<Option<OrderId>, StoreError> {
    let reply = api
        .create_order(&CheckoutRequest {
            payment_method: method.to_string(),
        })
        .await?;

    let Some(order_id) = reply.order_id().map(OrderId::new).transpose()? else {
        tracing::warn!("order created but the reply carried no order id");
        return Ok(None);
    };
    tracing::info!(order_id = %order_id, method, "order created");

    if let Some(url) = reply.payment_url() {
        println!("complete your payment at: {url}");
        return Ok(Some(order_id));
    }

    if method == "simulate" {
        let order = api.pay_order(&order_id).await?;
        tracing::info!(order_id = %order_id, status = %order.status, "simulated payment");
    }
    Ok(Some(order_id))
}

async fn watch_order(api: Arc<StoreApi>, order_id: OrderId, policy: PollPolicy) -> ExitCode {
    let mut reconciler = Reconciler::new(api, policy);
    let mut states = reconciler.subscribe();
    reconciler.start(order_id.clone());

    let settled = tokio::select! {
        res = states.wait_for(ReconcileState::is_settled) => match res {
            Ok(state) => state.clone(),
            Err(_) => return ExitCode::FAILURE,
        },
        _ = shutdown_signal() => {
            tracing::info!(order_id = %order_id, "interrupted, cancelling payment watch");
            reconciler.cancel();
            match reconciler.subscribe().wait_for(ReconcileState::is_settled).await {
                Ok(state) => state.clone(),
                Err(_) => return ExitCode::FAILURE,
            }
        }
    };

    let ReconcileState::Settled { outcome, order } = settled else {
        return ExitCode::FAILURE;
    };

    match outcome {
        PollOutcome::Paid => {
            tracing::info!(order_id = %order_id, "payment confirmed");
            ExitCode::SUCCESS
        }
        PollOutcome::Failed => {
            let status = order.map(|o| o.status.to_string()).unwrap_or_default();
            tracing::error!(order_id = %order_id, status, "payment failed");
            ExitCode::from(1)
        }
        PollOutcome::TimedOut => {
            tracing::warn!(
                order_id = %order_id,
                "no confirmation yet; the payment may still be processing, check again later"
            );
            ExitCode::from(2)
        }
        PollOutcome::Cancelled => ExitCode::from(130),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
