//! CLI for interacting with escrow auctions on the mock chain.
//!
//! This binary provides commands for:
//! - Funding wallets
//! - Initializing, starting and ending auctions
//! - Bidding and claiming the treasury
//! - Querying auction status

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::{Deserialize, Serialize};
use tracing::info;

use auction_client::{now_ms, parse_address, AuctionSetup};
use auction_module::{AuctionCall, FeeSchedule};
use auction_types::{Address, BASE_UNITS_PER_UNIT};

#[derive(Parser)]
#[command(name = "auction-cli")]
#[command(about = "CLI for escrow auctions")]
struct Cli {
    /// Mock chain RPC endpoint
    #[arg(long, env = "AUCTION_RPC", default_value = "http://127.0.0.1:9944")]
    rpc: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fund a wallet (mock chain only)
    Airdrop {
        /// Wallet address (hex)
        #[arg(long)]
        address: String,

        /// Amount in base units
        #[arg(long)]
        lamports: u64,
    },

    /// Escrow a deposit and create an auction
    Initialize {
        /// Creator address (hex)
        #[arg(long)]
        sender: String,

        /// Treasury mint (hex)
        #[arg(long)]
        mint: String,

        /// Deposit in base units
        #[arg(long, default_value_t = 3 * BASE_UNITS_PER_UNIT)]
        deposit: u64,

        /// Auction id; derived from the clock when omitted
        #[arg(long)]
        id: Option<i64>,

        /// Wallet to draw the deposit from (hex); defaults to the sender
        #[arg(long)]
        deposit_source: Option<String>,
    },

    /// Open bidding
    Start {
        /// Creator address (hex)
        #[arg(long)]
        sender: String,

        /// Auction address (hex)
        #[arg(long)]
        auction: String,
    },

    /// Bid the current price
    Bid {
        /// Bidder address (hex)
        #[arg(long)]
        sender: String,

        /// Auction address (hex)
        #[arg(long)]
        auction: String,

        /// Bid timestamp (ms); defaults to now
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Close bidding and split the chest
    End {
        /// Creator address (hex)
        #[arg(long)]
        sender: String,

        /// Auction address (hex)
        #[arg(long)]
        auction: String,

        /// Receiver of the chest remainder (hex)
        #[arg(long)]
        treasury_destination: String,
    },

    /// Claim the treasury deposit
    Claim {
        /// Winner, or creator if nobody bid (hex)
        #[arg(long)]
        sender: String,

        /// Auction address (hex)
        #[arg(long)]
        auction: String,

        /// Receiver (hex); defaults to the sender
        #[arg(long)]
        destination: Option<String>,
    },

    /// Get auction details
    GetAuction {
        /// Auction address (hex)
        #[arg(long)]
        auction: String,
    },

    /// Show what the next bids on an auction will cost
    Quote {
        /// Auction address (hex)
        #[arg(long)]
        auction: String,

        /// Number of upcoming bids to price
        #[arg(long, default_value_t = 5)]
        count: u32,
    },

    /// List all auctions
    ListAuctions,

    /// Get bids for an auction
    GetBids {
        /// Auction address (hex)
        #[arg(long)]
        auction: String,
    },

    /// Get a wallet balance
    Balance {
        /// Wallet address (hex)
        #[arg(long)]
        address: String,
    },

    /// Print transaction logs
    Logs {
        /// First slot to include
        #[arg(long, default_value_t = 0)]
        from_slot: u64,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ChainInfo {
    slot: u64,
    program_id: String,
    fees: FeeSchedule,
}

#[derive(Debug, Serialize, Deserialize)]
struct AuctionStateRpc {
    address: String,
    version: u64,
    id: i64,
    authority: String,
    treasury_mint: String,
    treasury: String,
    bidders_chest: String,
    deposit: u64,
    starting_price: u64,
    next_bid: u64,
    bid_count: u32,
    claimed: bool,
    state: String,
    last_bidder: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BidRecordRpc {
    auction: String,
    bidder: String,
    bid_value: u64,
    ts: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettlementRpc {
    auction: String,
    total: u64,
    creator_gain: u64,
    treasury_gain: u64,
    winner: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TransactionLog {
    slot: u64,
    lines: Vec<String>,
}

fn units(lamports: u64) -> String {
    format!("{:.9}", lamports as f64 / BASE_UNITS_PER_UNIT as f64)
}

async fn program_id(client: &HttpClient) -> Result<Address> {
    let info: ChainInfo = client.request("chain_getInfo", rpc_params![]).await?;
    Ok(parse_address(&info.program_id)?)
}

async fn fetch_auction(client: &HttpClient, auction: &str) -> Result<AuctionStateRpc> {
    let found: Option<AuctionStateRpc> = client
        .request("query_getAuction", rpc_params![auction])
        .await?;
    found.ok_or_else(|| anyhow!("Auction {} not found", auction))
}

/// Rebuild the creator-side setup of an auction that already exists.
async fn setup_for(client: &HttpClient, auction: &AuctionStateRpc) -> Result<AuctionSetup> {
    let setup = AuctionSetup::with_id(
        program_id(client).await?,
        parse_address(&auction.authority)?,
        parse_address(&auction.treasury_mint)?,
        auction.id,
    )?;
    if hex::encode(setup.auction()) != auction.address {
        return Err(anyhow!("Auction {} does not match its derivation", auction.address));
    }
    Ok(setup)
}

async fn initialize_cmd(
    client: &HttpClient,
    sender: &str,
    mint: &str,
    deposit: u64,
    id: Option<i64>,
    deposit_source: Option<String>,
) -> Result<()> {
    let program = program_id(client).await?;
    let creator = parse_address(sender)?;
    let mint = parse_address(mint)?;
    let setup = match id {
        Some(id) => AuctionSetup::with_id(program, creator, mint, id)?,
        None => AuctionSetup::derive(program, creator, mint, now_ms())?,
    };

    let params = serde_json::json!({
        "sender": sender,
        "id": setup.id(),
        "state_bump": setup.addresses.auction_bump,
        "deposit_amount": deposit,
        "state": hex::encode(setup.addresses.auction),
        "treasury": hex::encode(setup.addresses.treasury),
        "chest": hex::encode(setup.addresses.bidders_chest),
        "treasury_mint": hex::encode(mint),
        "deposit_source": deposit_source,
    });

    let auction: AuctionStateRpc = client
        .request("auction_initialize", rpc_params![params])
        .await?;

    info!("Initialized auction {}", auction.address);
    println!("Auction: {}", auction.address);
    println!("  Id: {}", auction.id);
    println!("  Treasury: {}", auction.treasury);
    println!("  Chest: {}", auction.bidders_chest);
    println!("  Starting price: {}", units(auction.starting_price));
    Ok(())
}

async fn bid_cmd(
    client: &HttpClient,
    sender: &str,
    auction: &str,
    timestamp: Option<i64>,
) -> Result<()> {
    let current = fetch_auction(client, auction).await?;
    let setup = setup_for(client, &current).await?;

    let mut builder = setup
        .bid(parse_address(sender)?)
        .expected_version(current.version);
    if let Some(ts) = timestamp {
        builder = builder.timestamp(ts);
    }
    let prepared = builder.build()?;

    let params = serde_json::json!({
        "sender": sender,
        "auction": auction,
        "chest": current.bidders_chest,
        "bid_record": hex::encode(prepared.bid_record),
        "timestamp": prepared.timestamp,
        "expected_version": current.version,
    });
    let record: BidRecordRpc = client.request("auction_bid", rpc_params![params]).await?;

    info!("Bid placed on {}", record.auction);
    println!("Bid accepted");
    println!("  Paid: {}", units(record.bid_value));
    println!("  Record: {}", hex::encode(prepared.bid_record));
    Ok(())
}

async fn end_cmd(
    client: &HttpClient,
    sender: &str,
    auction: &str,
    treasury_destination: &str,
) -> Result<()> {
    let current = fetch_auction(client, auction).await?;
    let setup = setup_for(client, &current).await?;
    let destination = parse_address(treasury_destination)?;

    let AuctionCall::End {
        chest_bump,
        expected_version,
        accounts,
    } = setup.end_call(current.version, destination)
    else {
        return Err(anyhow!("Unexpected call shape"));
    };

    let params = serde_json::json!({
        "sender": sender,
        "auction": auction,
        "chest": hex::encode(accounts.chest),
        "treasury_destination": hex::encode(accounts.treasury_destination),
        "chest_bump": chest_bump,
        "expected_version": expected_version,
    });
    let result: SettlementRpc = client.request("auction_end", rpc_params![params]).await?;

    println!("Auction ended:");
    println!("  Chest total: {}", units(result.total));
    println!("  Creator gain: {}", units(result.creator_gain));
    println!("  Treasury gain: {}", units(result.treasury_gain));
    match result.winner {
        Some(w) => println!("  Winner: {}", w),
        None => println!("  No bids"),
    }
    Ok(())
}

async fn quote_cmd(client: &HttpClient, auction: &str, count: u32) -> Result<()> {
    let current = fetch_auction(client, auction).await?;
    let info: ChainInfo = client.request("chain_getInfo", rpc_params![]).await?;

    println!("Upcoming bids on {}:", current.address);
    for k in 1..=count {
        let price = info.fees.price_of_bid(current.next_bid, k)?;
        println!("  [{}] {}", current.bid_count + k, units(price));
    }
    Ok(())
}

fn print_auction(a: &AuctionStateRpc) {
    println!("Auction {}:", a.address);
    println!("  State: {}", a.state);
    println!("  Version: {}", a.version);
    println!("  Creator: {}", a.authority);
    println!("  Deposit: {}", units(a.deposit));
    println!("  Starting price: {}", units(a.starting_price));
    println!("  Next bid: {}", units(a.next_bid));
    println!("  Bids: {}", a.bid_count);
    if let Some(bidder) = &a.last_bidder {
        println!("  Last bidder: {}", bidder);
    }
    if a.claimed {
        println!("  Treasury claimed");
    }
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
    let client = HttpClientBuilder::default()
        .build(&cli.rpc)
        .with_context(|| format!("connecting to {}", cli.rpc))?;

    match cli.command {
        Commands::Airdrop { address, lamports } => {
            let balance: u64 = client
                .request("admin_airdrop", rpc_params![address.clone(), lamports])
                .await?;
            println!("{} balance: {}", address, units(balance));
        }

        Commands::Initialize {
            sender,
            mint,
            deposit,
            id,
            deposit_source,
        } => {
            initialize_cmd(&client, &sender, &mint, deposit, id, deposit_source).await?;
        }

        Commands::Start { sender, auction } => {
            let current = fetch_auction(&client, &auction).await?;
            let params = serde_json::json!({
                "sender": sender,
                "auction": auction,
                "expected_version": current.version,
            });
            let updated: AuctionStateRpc =
                client.request("auction_start", rpc_params![params]).await?;
            println!("Auction {} is {}", updated.address, updated.state);
        }

        Commands::Bid {
            sender,
            auction,
            timestamp,
        } => {
            bid_cmd(&client, &sender, &auction, timestamp).await?;
        }

        Commands::End {
            sender,
            auction,
            treasury_destination,
        } => {
            end_cmd(&client, &sender, &auction, &treasury_destination).await?;
        }

        Commands::Claim {
            sender,
            auction,
            destination,
        } => {
            let current = fetch_auction(&client, &auction).await?;
            let params = serde_json::json!({
                "sender": sender,
                "auction": auction,
                "treasury": current.treasury,
                "destination": destination,
                "expected_version": current.version,
            });
            let amount: u64 = client.request("auction_claim", rpc_params![params]).await?;
            println!("Claimed {}", units(amount));
        }

        Commands::GetAuction { auction } => {
            let found: Option<AuctionStateRpc> = client
                .request("query_getAuction", rpc_params![auction.clone()])
                .await?;
            match found {
                Some(a) => print_auction(&a),
                None => println!("Auction {} not found", auction),
            }
        }

        Commands::Quote { auction, count } => {
            quote_cmd(&client, &auction, count).await?;
        }

        Commands::ListAuctions => {
            let auctions: Vec<AuctionStateRpc> =
                client.request("query_listAuctions", rpc_params![]).await?;
            if auctions.is_empty() {
                println!("No auctions found");
            } else {
                println!("Auctions:");
                for a in auctions {
                    println!(
                        "  [{}] {} - {} next bid {} ({} bids)",
                        a.id,
                        a.address,
                        a.state,
                        units(a.next_bid),
                        a.bid_count
                    );
                }
            }
        }

        Commands::GetBids { auction } => {
            let bids: Vec<BidRecordRpc> = client
                .request("query_getAuctionBids", rpc_params![auction.clone()])
                .await?;
            if bids.is_empty() {
                println!("No bids for auction {}", auction);
            } else {
                println!("Bids for auction {}:", auction);
                for (i, bid) in bids.iter().enumerate() {
                    println!("  [{}] {} paid {} at {}", i, bid.bidder, units(bid.bid_value), bid.ts);
                }
            }
        }

        Commands::Balance { address } => {
            let balance: u64 = client
                .request("query_getBalance", rpc_params![address.clone()])
                .await?;
            println!("{}: {}", address, units(balance));
        }

        Commands::Logs { from_slot } => {
            let logs: Vec<TransactionLog> =
                client.request("chain_getLogs", rpc_params![from_slot]).await?;
            for log in logs {
                for line in log.lines {
                    println!("[{}] {}", log.slot, line);
                }
            }
        }
    }

    Ok(())
}
