//! CLI for interacting with sealed-bid domain auctions.
//!
//! This binary provides commands for:
//! - Starting auctions for names
//! - Submitting blinded bids and revealing them
//! - Finalizing auctions and withdrawing refunds
//! - Querying auctions and the name registry

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use auction_client::BidBuilder;
use auction_types::{Address, Secret};

#[derive(Parser)]
#[command(name = "auction-cli")]
#[command(about = "CLI for sealed-bid domain auctions")]
struct Cli {
    /// Mock chain RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9944")]
    rpc: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an auction for a name
    Start {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Name to auction
        #[arg(long)]
        name: String,
    },

    /// Submit a blinded bid
    Bid {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Name being auctioned
        #[arg(long)]
        name: String,

        /// Bid amount (kept secret until reveal)
        #[arg(long)]
        amount: u64,

        /// Deposit attached to the bid (defaults to the amount)
        #[arg(long)]
        deposit: Option<u64>,

        /// Submit a decoy bid
        #[arg(long)]
        fake: bool,

        /// Secret phrase instead of a random secret (up to 32 bytes)
        #[arg(long)]
        secret: Option<String>,
    },

    /// Reveal all bids, in the order they were submitted
    Reveal {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Name being auctioned
        #[arg(long)]
        name: String,

        /// Bid amounts (comma-separated)
        #[arg(long)]
        amounts: String,

        /// Genuine flags (comma-separated true/false)
        #[arg(long)]
        genuine: String,

        /// Hex secrets printed by `bid` (comma-separated)
        #[arg(long)]
        secrets: String,
    },

    /// Finalize an auction after the reveal deadline
    Finalize {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Name being auctioned
        #[arg(long)]
        name: String,
    },

    /// Withdraw pending refunds
    Withdraw {
        /// Sender address (hex)
        #[arg(long)]
        sender: String,

        /// Name being auctioned
        #[arg(long)]
        name: String,
    },

    /// Get auction details
    GetAuction {
        /// Name being auctioned
        #[arg(long)]
        name: String,
    },

    /// List all auctions
    ListAuctions,

    /// Look up the owner of a name
    Resolve {
        /// Registered name
        #[arg(long)]
        name: String,
    },

    /// List names owned by an address
    Domains {
        /// Owner address (hex)
        #[arg(long)]
        owner: String,
    },

    /// List every owner with its names
    Owners,

    /// Advance chain time (for testing)
    AdvanceTime {
        /// Seconds to move forward
        #[arg(long)]
        seconds: u64,
    },

    /// Set chain timestamp (for testing)
    SetTimestamp {
        /// Unix timestamp to set
        #[arg(long)]
        timestamp: u64,
    },

    /// Advance the chain by one block (for testing)
    AdvanceBlock,
}

#[derive(Debug, Serialize, Deserialize)]
struct BlockInfo {
    height: u64,
    timestamp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AuctionSummaryRpc {
    resource_name: String,
    beneficiary: String,
    phase: String,
    bidding_deadline: u64,
    reveal_deadline: u64,
    highest_bid: u64,
    highest_bidder: Option<String>,
    num_bidders: usize,
    num_commitments: usize,
    contract_balance: u64,
    ended: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OwnerListingRpc {
    owner: String,
    domains: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RevealResultRpc {
    refunded_amount: u64,
    any_valid: bool,
    outcomes: Vec<String>,
    leading: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct AuctionResultRpc {
    resource_name: String,
    winner: Option<String>,
    highest_bid: u64,
    beneficiary: String,
    contract_balance: u64,
    finalized_at: u64,
}

fn parse_address(s: &str) -> Result<Address> {
    let bytes = hex::decode(s.trim_start_matches("0x"))?;
    if bytes.len() > 32 {
        return Err(anyhow!("Address must be at most 32 bytes"));
    }
    let mut addr = [0u8; 32];
    addr[..bytes.len()].copy_from_slice(&bytes);
    Ok(addr)
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn print_summary(a: &AuctionSummaryRpc) {
    println!("Auction {}:", a.resource_name);
    println!("  Phase: {}", a.phase);
    println!("  Beneficiary: {}", a.beneficiary);
    println!("  Bidding Deadline: {}", a.bidding_deadline);
    println!("  Reveal Deadline: {}", a.reveal_deadline);
    println!("  Highest Bid: {}", a.highest_bid);
    if let Some(bidder) = &a.highest_bidder {
        println!("  Highest Bidder: {}", bidder);
    }
    println!("  Bidders: {} ({} commitments)", a.num_bidders, a.num_commitments);
    println!("  Contract Balance: {}", a.contract_balance);
}

async fn start_cmd(client: &HttpClient, sender: &str, name: &str) -> Result<()> {
    let summary: AuctionSummaryRpc = client.request("auction_start", (sender, name)).await?;
    info!("Started auction for {}", name);
    print_summary(&summary);
    Ok(())
}

async fn bid_cmd(
    client: &HttpClient,
    sender: &str,
    name: &str,
    amount: u64,
    deposit: Option<u64>,
    fake: bool,
    secret: Option<String>,
) -> Result<()> {
    let mut builder = BidBuilder::new(parse_address(sender)?).amount(amount);
    if let Some(deposit) = deposit {
        builder = builder.deposit(deposit);
    }
    if fake {
        builder = builder.fake();
    }
    if let Some(phrase) = secret {
        builder = builder.secret(Secret::from_phrase(&phrase)?);
    }

    let mut rng = OsRng;
    let prepared = builder.build(&mut rng)?;

    let params = serde_json::json!({
        "sender": sender,
        "resource_name": name,
        "digest": hex::encode(prepared.digest.0),
        "deposit": prepared.deposit
    });

    let total_deposit: u64 = client.request("auction_submitBid", vec![params]).await?;

    info!("Bid submitted for {}", name);
    println!("Bid submitted successfully");
    println!("  Name: {}", name);
    let kind = if prepared.is_genuine { "genuine" } else { "fake" };
    println!("  Amount: {} ({})", prepared.amount, kind);
    println!("  Deposit: {} (total {})", prepared.deposit, total_deposit);
    println!("  Digest: {}", hex::encode(prepared.digest.0));
    println!("  Secret: {}", hex::encode(prepared.secret.0));
    println!("Keep the secret: it is required to reveal this bid.");

    Ok(())
}

async fn reveal_cmd(
    client: &HttpClient,
    sender: &str,
    name: &str,
    amounts: &str,
    genuine: &str,
    secrets: &str,
) -> Result<()> {
    let amounts = split_list(amounts)
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()?;
    let genuine = split_list(genuine)
        .map(str::parse::<bool>)
        .collect::<Result<Vec<_>, _>>()?;
    let secrets: Vec<&str> = split_list(secrets).collect();

    let params = serde_json::json!({
        "sender": sender,
        "resource_name": name,
        "amounts": amounts,
        "genuine": genuine,
        "secrets": secrets
    });

    let result: RevealResultRpc = client.request("auction_reveal", vec![params]).await?;

    println!("Bids revealed for {}", name);
    println!("  Outcomes: {}", result.outcomes.join(", "));
    println!("  Refunded: {}", result.refunded_amount);
    println!("  Any Valid: {}", result.any_valid);
    if result.leading {
        println!("  You are the highest bidder");
    }

    Ok(())
}

async fn finalize_cmd(client: &HttpClient, sender: &str, name: &str) -> Result<()> {
    let result: AuctionResultRpc = client.request("auction_finalize", (sender, name)).await?;

    println!("Auction {} finalized:", result.resource_name);
    match &result.winner {
        Some(winner) => println!("  Winner: {}", winner),
        None => println!("  Winner: none"),
    }
    println!("  Highest Bid: {}", result.highest_bid);
    println!("  Paid To: {}", result.beneficiary);
    println!("  Contract Balance: {}", result.contract_balance);

    Ok(())
}

async fn get_auction_cmd(client: &HttpClient, name: &str) -> Result<()> {
    let auction: Option<AuctionSummaryRpc> = client.request("query_getAuction", vec![name]).await?;

    match auction {
        Some(a) => print_summary(&a),
        None => println!("Auction {} not found", name),
    }

    Ok(())
}

async fn list_auctions_cmd(client: &HttpClient) -> Result<()> {
    let auctions: Vec<AuctionSummaryRpc> =
        client.request("query_listAuctions", Vec::<()>::new()).await?;

    if auctions.is_empty() {
        println!("No auctions found");
    } else {
        println!("Auctions:");
        for a in auctions {
            println!(
                "  {} - {} (highest bid {}, {} bidders)",
                a.resource_name, a.phase, a.highest_bid, a.num_bidders
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auction_cli=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let client = HttpClientBuilder::default().build(&cli.rpc)?;

    match cli.command {
        Commands::Start { sender, name } => {
            start_cmd(&client, &sender, &name).await?;
        }

        Commands::Bid {
            sender,
            name,
            amount,
            deposit,
            fake,
            secret,
        } => {
            bid_cmd(&client, &sender, &name, amount, deposit, fake, secret).await?;
        }

        Commands::Reveal {
            sender,
            name,
            amounts,
            genuine,
            secrets,
        } => {
            reveal_cmd(&client, &sender, &name, &amounts, &genuine, &secrets).await?;
        }

        Commands::Finalize { sender, name } => {
            finalize_cmd(&client, &sender, &name).await?;
        }

        Commands::Withdraw { sender, name } => {
            let amount: u64 = client.request("auction_withdraw", (&sender, &name)).await?;
            println!("Withdrew {} from {}", amount, name);
        }

        Commands::GetAuction { name } => {
            get_auction_cmd(&client, &name).await?;
        }

        Commands::ListAuctions => {
            list_auctions_cmd(&client).await?;
        }

        Commands::Resolve { name } => {
            let owner: Option<String> = client.request("query_resolve", vec![&name]).await?;
            match owner {
                Some(owner) => println!("{} is owned by {}", name, owner),
                None => println!("{} is not registered", name),
            }
        }

        Commands::Domains { owner } => {
            let domains: Vec<String> = client.request("query_getDomains", vec![&owner]).await?;
            if domains.is_empty() {
                println!("No names owned by {}", owner);
            } else {
                for domain in domains {
                    println!("  {}", domain);
                }
            }
        }

        Commands::Owners => {
            let owners: Vec<OwnerListingRpc> =
                client.request("query_listOwners", Vec::<()>::new()).await?;
            if owners.is_empty() {
                println!("No names registered");
            } else {
                for listing in owners {
                    println!("{}:", listing.owner);
                    for domain in listing.domains {
                        println!("  {}", domain);
                    }
                }
            }
        }

        Commands::AdvanceTime { seconds } => {
            let info: BlockInfo = client.request("admin_advanceTime", vec![seconds]).await?;
            println!("Time advanced: height={}, timestamp={}", info.height, info.timestamp);
        }

        Commands::SetTimestamp { timestamp } => {
            let _: bool = client.request("admin_setTimestamp", vec![timestamp]).await?;
            println!("Timestamp set to {}", timestamp);
        }

        Commands::AdvanceBlock => {
            let info: BlockInfo = client.request("admin_advanceBlock", Vec::<()>::new()).await?;
            println!("Block advanced: height={}, timestamp={}", info.height, info.timestamp);
        }
    }

    Ok(())
}
