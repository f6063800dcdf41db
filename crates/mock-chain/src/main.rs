//! Mock chain server for local testing of escrow auctions.
//!
//! This provides a JSON-RPC server that hosts the auction engine over an
//! in-memory ledger, without requiring a real blockchain.

use anyhow::{Context, Result};
use clap::Parser;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use auction_module::{
    queries, AuctionCall, AuctionEngine, AuctionGenesisConfig, CallContext, CallOutcome,
    InMemoryLedger, Ledger, TransactionLog,
};
use auction_types::Address;

mod types;
use types::*;

#[derive(Parser)]
#[command(name = "mock-chain")]
#[command(about = "Local JSON-RPC chain hosting the escrow auction program")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:9944")]
    listen: SocketAddr,

    /// Genesis configuration (JSON); defaults apply when omitted
    #[arg(long)]
    genesis: Option<PathBuf>,
}

/// Shared chain state.
struct ChainState {
    engine: AuctionEngine<InMemoryLedger>,
}

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MockChainApi {
    // ============ Admin Methods ============

    /// Credit a system wallet. Returns the new balance.
    #[method(name = "admin_airdrop")]
    async fn admin_airdrop(&self, address: String, lamports: u64) -> Result<u64, ErrorObjectOwned>;

    // ============ Auction Methods ============

    /// Escrow a deposit and create an auction.
    #[method(name = "auction_initialize")]
    async fn auction_initialize(
        &self,
        params: InitializeParams,
    ) -> Result<AuctionStateRpc, ErrorObjectOwned>;

    /// Open bidding.
    #[method(name = "auction_start")]
    async fn auction_start(&self, params: StartParams) -> Result<AuctionStateRpc, ErrorObjectOwned>;

    /// Place a bid at the current price.
    #[method(name = "auction_bid")]
    async fn auction_bid(&self, params: BidParams) -> Result<BidRecordRpc, ErrorObjectOwned>;

    /// Close bidding and split the chest.
    #[method(name = "auction_end")]
    async fn auction_end(&self, params: EndParams) -> Result<SettlementRpc, ErrorObjectOwned>;

    /// Release the treasury deposit.
    #[method(name = "auction_claim")]
    async fn auction_claim(&self, params: ClaimParams) -> Result<u64, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get current chain info.
    #[method(name = "chain_getInfo")]
    async fn chain_get_info(&self) -> Result<ChainInfo, ErrorObjectOwned>;

    /// Get transaction logs from a slot onwards.
    #[method(name = "chain_getLogs")]
    async fn chain_get_logs(&self, from_slot: u64) -> Result<Vec<TransactionLog>, ErrorObjectOwned>;

    /// Get auction by address.
    #[method(name = "query_getAuction")]
    async fn query_get_auction(
        &self,
        auction: String,
    ) -> Result<Option<AuctionStateRpc>, ErrorObjectOwned>;

    /// List all auctions.
    #[method(name = "query_listAuctions")]
    async fn query_list_auctions(&self) -> Result<Vec<AuctionStateRpc>, ErrorObjectOwned>;

    /// Get all bids for an auction.
    #[method(name = "query_getAuctionBids")]
    async fn query_get_auction_bids(
        &self,
        auction: String,
    ) -> Result<Vec<BidRecordRpc>, ErrorObjectOwned>;

    /// Get an account balance.
    #[method(name = "query_getBalance")]
    async fn query_get_balance(&self, address: String) -> Result<u64, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server.
struct MockChainServer {
    state: Arc<RwLock<ChainState>>,
}

impl MockChainServer {
    fn new(engine: AuctionEngine<InMemoryLedger>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ChainState { engine })),
        }
    }

    fn rpc_error(msg: &str) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
    }

    fn address(field: &str, s: &str) -> Result<Address, ErrorObjectOwned> {
        parse_address(field, s).map_err(|e| Self::rpc_error(&e))
    }

    fn execute(
        &self,
        parsed: Result<(Address, AuctionCall), String>,
    ) -> Result<(Address, CallOutcome), ErrorObjectOwned> {
        let (sender, call) = parsed.map_err(|e| Self::rpc_error(&e))?;
        let auction = *call.auction();
        let name = call.name();
        let outcome = self
            .state
            .write()
            .engine
            .execute(&CallContext::new(sender), call)
            .map_err(|e| Self::rpc_error(&format!("Failed to {name}: {e}")))?;
        Ok((auction, outcome))
    }

    fn auction_rpc(&self, auction: &Address) -> Result<AuctionStateRpc, ErrorObjectOwned> {
        self.state
            .read()
            .engine
            .auction(auction)
            .map(|v| AuctionStateRpc::from(&v))
            .ok_or_else(|| Self::rpc_error("Auction vanished after commit"))
    }

    fn unexpected(outcome: CallOutcome) -> ErrorObjectOwned {
        Self::rpc_error(&format!("Unexpected outcome: {outcome:?}"))
    }
}

#[async_trait]
impl MockChainApiServer for MockChainServer {
    async fn admin_airdrop(&self, address: String, lamports: u64) -> Result<u64, ErrorObjectOwned> {
        let target = Self::address("address", &address)?;
        let balance = self
            .state
            .write()
            .engine
            .ledger_mut()
            .airdrop(target, lamports)
            .map_err(|e| Self::rpc_error(&format!("Airdrop failed: {e}")))?;
        info!("Airdropped {} to {}", lamports, address);
        Ok(balance)
    }

    async fn auction_initialize(
        &self,
        params: InitializeParams,
    ) -> Result<AuctionStateRpc, ErrorObjectOwned> {
        match self.execute(params.into_call())? {
            (auction, CallOutcome::Initialized(_)) => {
                info!("Initialized auction {}", hex::encode(auction));
                self.auction_rpc(&auction)
            }
            (_, other) => Err(Self::unexpected(other)),
        }
    }

    async fn auction_start(&self, params: StartParams) -> Result<AuctionStateRpc, ErrorObjectOwned> {
        match self.execute(params.into_call())? {
            (auction, CallOutcome::Started(_)) => {
                info!("Started auction {}", hex::encode(auction));
                self.auction_rpc(&auction)
            }
            (_, other) => Err(Self::unexpected(other)),
        }
    }

    async fn auction_bid(&self, params: BidParams) -> Result<BidRecordRpc, ErrorObjectOwned> {
        match self.execute(params.into_call())? {
            (auction, CallOutcome::BidPlaced(record)) => {
                info!(
                    "Bid of {} on auction {} by {}",
                    record.bid_value,
                    hex::encode(auction),
                    hex::encode(record.bidder)
                );
                Ok(BidRecordRpc::from(&record))
            }
            (_, other) => Err(Self::unexpected(other)),
        }
    }

    async fn auction_end(&self, params: EndParams) -> Result<SettlementRpc, ErrorObjectOwned> {
        match self.execute(params.into_call())? {
            (auction, CallOutcome::Ended(result)) => {
                info!(
                    "Auction {} ended. Creator: {}, Treasury: {}",
                    hex::encode(auction),
                    result.creator_gain,
                    result.treasury_gain
                );
                Ok(SettlementRpc::from(result))
            }
            (_, other) => Err(Self::unexpected(other)),
        }
    }

    async fn auction_claim(&self, params: ClaimParams) -> Result<u64, ErrorObjectOwned> {
        match self.execute(params.into_call())? {
            (auction, CallOutcome::Claimed { amount }) => {
                info!("Claimed {} from auction {}", amount, hex::encode(auction));
                Ok(amount)
            }
            (_, other) => Err(Self::unexpected(other)),
        }
    }

    async fn chain_get_info(&self) -> Result<ChainInfo, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(ChainInfo {
            slot: state.engine.ledger().slot(),
            program_id: hex::encode(state.engine.program_id()),
            fees: state.engine.config().fees,
        })
    }

    async fn chain_get_logs(&self, from_slot: u64) -> Result<Vec<TransactionLog>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .engine
            .ledger()
            .logs()
            .iter()
            .filter(|log| log.slot >= from_slot)
            .cloned()
            .collect())
    }

    async fn query_get_auction(
        &self,
        auction: String,
    ) -> Result<Option<AuctionStateRpc>, ErrorObjectOwned> {
        let address = Self::address("auction", &auction)?;
        let state = self.state.read();
        Ok(state.engine.auction(&address).map(|v| AuctionStateRpc::from(&v)))
    }

    async fn query_list_auctions(&self) -> Result<Vec<AuctionStateRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        let auctions = queries::list_auctions(state.engine.ledger(), state.engine.program_id());
        Ok(auctions.iter().map(AuctionStateRpc::from).collect())
    }

    async fn query_get_auction_bids(
        &self,
        auction: String,
    ) -> Result<Vec<BidRecordRpc>, ErrorObjectOwned> {
        let address = Self::address("auction", &auction)?;
        let state = self.state.read();
        let bids =
            queries::get_auction_bids(state.engine.ledger(), state.engine.program_id(), &address);
        Ok(bids.iter().map(BidRecordRpc::from).collect())
    }

    async fn query_get_balance(&self, address: String) -> Result<u64, ErrorObjectOwned> {
        let address = Self::address("address", &address)?;
        Ok(self.state.read().engine.ledger().balance(&address))
    }
}

fn load_genesis(path: Option<&PathBuf>) -> Result<AuctionGenesisConfig> {
    let Some(path) = path else {
        return Ok(AuctionGenesisConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading genesis file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing genesis file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mock_chain=info".parse()?)
                .add_directive("auction_module=info".parse()?)
                .add_directive("jsonrpsee=warn".parse()?),
        )
        .init();

    let args = Args::parse();
    let genesis = load_genesis(args.genesis.as_ref())?;
    let engine = AuctionEngine::new(InMemoryLedger::new(), genesis)
        .context("invalid genesis configuration")?;

    info!(
        "Starting mock chain server on {} (program {})",
        args.listen,
        hex::encode(engine.program_id())
    );

    let server = Server::builder().build(args.listen).await?;
    let handle = server.start(MockChainServer::new(engine).into_rpc());

    info!("Mock chain server running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
