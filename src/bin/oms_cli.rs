//! OMS CLI: run order-service calls against a configured instance.
//!
//! Usage:
//!   oms-cli shipment-items <shipmentId>...      Batched ShipmentItem lookup
//!   oms-cli contact-details <orderId>           Customer contact details
//!   oms-cli open-orders <query-json>            Raw solr-query for open orders
//!   oms-cli reject-item <payload-json>          Reject an order item

use anyhow::{bail, Context};
use oms_client::notify::TracingUiSink;
use oms_client::{ApiResponse, ClientConfig, OrderService, RejectItemPayload};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "shipment-items" => cmd_shipment_items(&args[2..]).await,
        "contact-details" => cmd_contact_details(&args[2..]).await,
        "open-orders" => cmd_open_orders(&args[2..]).await,
        "reject-item" => cmd_reject_item(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("oms-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"oms-cli: order-management backend client

USAGE:
    oms-cli <COMMAND> [ARGS]

COMMANDS:
    shipment-items <shipmentId>...   Fetch items of the given shipments
    contact-details <orderId>        Fetch customer contact details of an order
    open-orders <query-json>         Run an open-orders solr query
    reject-item <payload-json>       Reject an order item
    version                          Show version information
    help                             Show this help message

ENVIRONMENT:
    OMS_INSTANCE_URL                 Instance name or base URL (required)
    OMS_API_TOKEN                    Bearer token
    OMS_HTTP_TIMEOUT_SECS            Request timeout (default 30)
    OMS_MAX_INFLIGHT                 Cap on concurrent requests
    RUST_LOG                         Log filter (default info)"#
    );
}

fn service() -> anyhow::Result<OrderService> {
    let config = ClientConfig::from_env().context("loading configuration")?;
    tracing::debug!(?config, "configuration loaded");
    Ok(OrderService::from_config(&config)?)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_response(resp: ApiResponse) -> anyhow::Result<()> {
    if resp.has_error() {
        bail!("backend error (HTTP {}): {}", resp.status, resp.failure_reason());
    }
    print_json(&resp.data)
}

async fn cmd_shipment_items(args: &[String]) -> anyhow::Result<()> {
    if args.is_empty() {
        bail!("shipment-items needs at least one shipment id");
    }
    let items = service()?.get_shipment_items(args.to_vec()).await?;
    tracing::info!(shipments = args.len(), items = items.len(), "shipment items fetched");
    print_json(&items)
}

async fn cmd_contact_details(args: &[String]) -> anyhow::Result<()> {
    let order_id = args.first().context("contact-details needs an order id")?;
    print_response(service()?.get_customer_contact_details(order_id).await?)
}

async fn cmd_open_orders(args: &[String]) -> anyhow::Result<()> {
    let raw = args.first().context("open-orders needs a query JSON")?;
    let query = serde_json::from_str(raw).context("parsing query JSON")?;
    print_response(service()?.get_open_orders(query).await?)
}

async fn cmd_reject_item(args: &[String]) -> anyhow::Result<()> {
    let raw = args.first().context("reject-item needs a payload JSON")?;
    let payload: RejectItemPayload = serde_json::from_str(raw).context("parsing payload JSON")?;
    let resp = service()?
        .reject_item_notified(&payload, &TracingUiSink)
        .await?;
    print_response(resp)
}
