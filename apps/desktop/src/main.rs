use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    await_commitment,
    balance::resolve_delta,
    cancel::cancellation_pair,
    config::{load_settings, Settings},
    entity_state::EntityStateReader,
    gateway::GatewayClient,
    preview_manifest,
    session::SessionContext,
};
use shared::{
    amount::Amount,
    domain::{AccountAddress, EntityAddress, IntentHash, OperationRequest, ResourceAddress},
};
use tracing::info;
use wallet_integration::Account;

#[derive(Parser, Debug)]
#[command(about = "Gumball machine and yield AMM transaction client")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the manifest an operation would send to the wallet.
    Manifest {
        #[arg(long)]
        account: String,
        #[command(subcommand)]
        operation: Operation,
    },
    /// Show the on-ledger state of a component.
    State {
        /// Defaults to the configured gumball machine.
        #[arg(long)]
        component: Option<String>,
    },
    /// Follow a submitted transaction until it is final.
    Track {
        intent_hash: String,
        /// Account whose balance changes are reported.
        #[arg(long)]
        account: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum Operation {
    Instantiate {
        #[arg(long)]
        price: Amount,
    },
    Buy {
        #[arg(long)]
        amount: Amount,
        /// Payment resource; XRD when omitted.
        #[arg(long)]
        resource: Option<String>,
    },
    SetPrice {
        #[arg(long)]
        price: Amount,
    },
    Withdraw,
    Refill,
    Redeem {
        #[arg(long)]
        pt_amount: Amount,
        #[arg(long)]
        yt_amount: Amount,
    },
}

impl Operation {
    fn into_request(self, settings: &Settings) -> Result<OperationRequest> {
        Ok(match self {
            Operation::Instantiate { price } => OperationRequest::Instantiate {
                package: settings
                    .package_address()?
                    .context("package_address is not configured")?,
                price,
            },
            Operation::Buy { amount, resource } => OperationRequest::Deposit {
                amount,
                resource: match resource {
                    Some(raw) => ResourceAddress::new(raw)?,
                    None => settings.network.xrd_address(),
                },
            },
            Operation::SetPrice { price } => OperationRequest::SetPrice { price },
            Operation::Withdraw => OperationRequest::Withdraw,
            Operation::Refill => OperationRequest::Refill,
            Operation::Redeem {
                pt_amount,
                yt_amount,
            } => OperationRequest::Redeem {
                pt_amount,
                yt_amount,
            },
        })
    }
}

fn session_from(settings: &Settings) -> Result<Arc<SessionContext>> {
    Ok(SessionContext::with_deployment(
        settings.network,
        settings.yield_amm()?,
        settings.known_addresses()?,
    ))
}

fn gateway_from(settings: &Settings) -> Result<Arc<GatewayClient>> {
    Ok(Arc::new(GatewayClient::with_timeout(
        settings.gateway_base_url()?,
        settings.request_timeout(),
    )?))
}

async fn print_manifest(settings: &Settings, account: String, operation: Operation) -> Result<()> {
    let session = session_from(settings)?;
    session
        .set_account(Some(Account {
            address: AccountAddress::new(account)?,
            label: None,
        }))
        .await;
    let request = operation.into_request(settings)?;
    let manifest = preview_manifest(&session, &request).await?;
    print!("{manifest}");
    Ok(())
}

async fn print_state(settings: &Settings, component: Option<String>) -> Result<()> {
    let session = session_from(settings)?;
    let reader = EntityStateReader::new(gateway_from(settings)?);

    let snapshot = match component {
        Some(raw) => reader.read_state(&EntityAddress::new(raw)?).await?,
        None => reader.read_session_component(&session).await?,
    };
    let view = snapshot.gumball_machine(
        session.gumball_resource().await.as_ref(),
        &session.xrd_address(),
    );
    let placeholder = |value: Option<Amount>| value.map_or_else(|| "-".to_string(), |v| v.to_string());

    println!("entity:        {}", snapshot.address);
    println!("state version: {}", snapshot.state_version);
    println!("price:         {}", placeholder(view.price));
    println!("gumballs:      {}", placeholder(view.gumballs));
    println!("earnings:      {}", placeholder(view.earnings));
    Ok(())
}

async fn track(settings: &Settings, intent_hash: String, account: Option<String>) -> Result<()> {
    let intent_hash = IntentHash::new(intent_hash)?;
    let ledger = gateway_from(settings)?;
    let (handle, mut signal) = cancellation_pair();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("tx: interrupt received; cancelling");
            handle.cancel();
        }
    });

    let receipt = await_commitment(
        ledger.as_ref(),
        &intent_hash,
        &settings.poll_policy(),
        &mut signal,
    )
    .await
    .map_err(|err| anyhow::anyhow!(err.to_failure().user_message()))?;

    println!("committed at state version {}", receipt.state_version);
    println!("fee paid: {}", receipt.fee_paid);
    if let Some(raw) = account {
        let account = AccountAddress::new(raw)?;
        let xrd = settings.network.xrd_address();
        println!("XRD change: {}", resolve_delta(&receipt, &account, &xrd));
    }
    println!(
        "{}",
        settings.network.dashboard_transaction_url(&receipt.intent_hash)
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let settings = load_settings();
    info!(network = %settings.network, "desktop: settings loaded");

    match args.command {
        Command::Manifest { account, operation } => {
            print_manifest(&settings, account, operation).await
        }
        Command::State { component } => print_state(&settings, component).await,
        Command::Track {
            intent_hash,
            account,
        } => track(&settings, intent_hash, account).await,
    }
}
