//! Mock chain server for local testing of sealed-bid domain auctions.
//!
//! This provides a JSON-RPC server that simulates on-chain state management
//! for the auction module without requiring a real blockchain. Time only moves
//! through the admin methods, so phase transitions can be driven by hand.

use anyhow::Result;
use clap::Parser;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use auction_module::{
    handlers, AuctionError, AuctionGenesisConfig, AuctionQuery, AuctionQueryResponse,
    CallContext, ModuleState,
};
use auction_types::{Address, AuctionEvent, BidDigest, RevealEntry, Secret};

mod types;
use types::*;

/// Seconds per simulated block.
const BLOCK_TIME: u64 = 12;

/// Shared chain state.
struct ChainState {
    /// Module state
    module: ModuleState,
    /// Genesis the module was last initialized from
    genesis: AuctionGenesisConfig,
    /// Current block height (simulated)
    block_height: u64,
    /// Current timestamp (simulated, can be advanced)
    timestamp: u64,
}

impl ChainState {
    fn new(genesis: AuctionGenesisConfig, timestamp: u64) -> Result<Self> {
        Ok(Self {
            module: ModuleState::from_genesis(&genesis)?,
            genesis,
            block_height: 0,
            timestamp,
        })
    }

    fn advance_block(&mut self) {
        self.block_height += 1;
        self.timestamp = self.timestamp.saturating_add(BLOCK_TIME);
    }

    fn set_timestamp(&mut self, ts: u64) {
        self.timestamp = ts;
    }

    fn context(&self, sender: Address, value: u64) -> CallContext {
        CallContext {
            sender,
            block_height: self.block_height,
            timestamp: self.timestamp,
            value,
        }
    }

    fn block_info(&self) -> BlockInfo {
        BlockInfo {
            height: self.block_height,
            timestamp: self.timestamp,
        }
    }

    fn query(&self, query: AuctionQuery) -> AuctionQueryResponse {
        auction_module::queries::handle_query(&self.module, query, self.timestamp)
    }
}

/// RPC API definition for the mock chain.
#[rpc(server)]
pub trait MockChainApi {
    // ============ Admin Methods ============

    /// Reset the chain with a new genesis config.
    #[method(name = "admin_init")]
    async fn admin_init(&self, config: GenesisConfigRpc) -> Result<bool, ErrorObjectOwned>;

    /// Advance the chain by one block.
    #[method(name = "admin_advanceBlock")]
    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Set the current timestamp (for testing time-dependent logic).
    #[method(name = "admin_setTimestamp")]
    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned>;

    /// Move the clock forward without producing a block.
    #[method(name = "admin_advanceTime")]
    async fn admin_advance_time(&self, seconds: u64) -> Result<BlockInfo, ErrorObjectOwned>;

    // ============ Auction Methods ============

    /// Start an auction for a resource name.
    #[method(name = "auction_start")]
    async fn auction_start(
        &self,
        sender: String,
        resource_name: String,
    ) -> Result<AuctionSummaryRpc, ErrorObjectOwned>;

    /// Submit a blinded bid. Returns the sender's total deposit.
    #[method(name = "auction_submitBid")]
    async fn auction_submit_bid(&self, params: SubmitBidParams) -> Result<u64, ErrorObjectOwned>;

    /// Reveal all of the sender's bids.
    #[method(name = "auction_reveal")]
    async fn auction_reveal(&self, params: RevealParams)
        -> Result<RevealResultRpc, ErrorObjectOwned>;

    /// Finalize an auction after its reveal deadline.
    #[method(name = "auction_finalize")]
    async fn auction_finalize(
        &self,
        sender: String,
        resource_name: String,
    ) -> Result<AuctionResultRpc, ErrorObjectOwned>;

    /// Withdraw the sender's pending refund.
    #[method(name = "auction_withdraw")]
    async fn auction_withdraw(
        &self,
        sender: String,
        resource_name: String,
    ) -> Result<u64, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Get current block info.
    #[method(name = "chain_getBlockInfo")]
    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned>;

    /// Get auction summary by resource name.
    #[method(name = "query_getAuction")]
    async fn query_get_auction(
        &self,
        resource_name: String,
    ) -> Result<Option<AuctionSummaryRpc>, ErrorObjectOwned>;

    /// List all auctions.
    #[method(name = "query_listAuctions")]
    async fn query_list_auctions(&self) -> Result<Vec<AuctionSummaryRpc>, ErrorObjectOwned>;

    /// Get auctions past their reveal deadline but not yet finalized.
    #[method(name = "query_getPendingFinalization")]
    async fn query_get_pending_finalization(&self) -> Result<Vec<String>, ErrorObjectOwned>;

    /// Get a bidder's commitments.
    #[method(name = "query_getCommitments")]
    async fn query_get_commitments(
        &self,
        resource_name: String,
        bidder: String,
    ) -> Result<Vec<CommitmentRpc>, ErrorObjectOwned>;

    /// Get a bidder's pending refund.
    #[method(name = "query_getPendingRefund")]
    async fn query_get_pending_refund(
        &self,
        resource_name: String,
        bidder: String,
    ) -> Result<u64, ErrorObjectOwned>;

    /// Get auction result.
    #[method(name = "query_getResult")]
    async fn query_get_result(
        &self,
        resource_name: String,
    ) -> Result<Option<AuctionResultRpc>, ErrorObjectOwned>;

    /// Resolve a name to its owner.
    #[method(name = "query_resolve")]
    async fn query_resolve(&self, resource_name: String)
        -> Result<Option<String>, ErrorObjectOwned>;

    /// Get names owned by an address.
    #[method(name = "query_getDomains")]
    async fn query_get_domains(&self, owner: String) -> Result<Vec<String>, ErrorObjectOwned>;

    /// List every owner with its names.
    #[method(name = "query_listOwners")]
    async fn query_list_owners(&self) -> Result<Vec<OwnerListingRpc>, ErrorObjectOwned>;

    /// Get funds paid out to an address.
    #[method(name = "query_getBalance")]
    async fn query_get_balance(&self, address: String) -> Result<u64, ErrorObjectOwned>;

    /// Get the event log of an auction.
    #[method(name = "query_getEvents")]
    async fn query_get_events(
        &self,
        resource_name: String,
    ) -> Result<Vec<EventRpc>, ErrorObjectOwned>;
}

/// Implementation of the mock chain RPC server.
struct MockChainServer {
    state: Arc<RwLock<ChainState>>,
}

impl MockChainServer {
    fn new(state: ChainState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn rpc_error(msg: &str) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
    }

    fn call_error(action: &str, err: AuctionError) -> ErrorObjectOwned {
        warn!(action, error = %err, "Call rejected");
        Self::rpc_error(&format!("Failed to {}: {}", action, err))
    }

    fn unexpected(response: AuctionQueryResponse) -> ErrorObjectOwned {
        Self::rpc_error(&format!("Unexpected query response: {:?}", response))
    }
}

#[async_trait]
impl MockChainApiServer for MockChainServer {
    async fn admin_init(&self, config: GenesisConfigRpc) -> Result<bool, ErrorObjectOwned> {
        let mut state = self.state.write();

        let genesis = merge_genesis(&state.genesis, &config)?;
        let timestamp = config.initial_timestamp.unwrap_or(state.timestamp);
        *state = ChainState::new(genesis, timestamp)
            .map_err(|e| Self::rpc_error(&format!("Invalid genesis: {}", e)))?;

        info!(timestamp, "Chain initialized");
        Ok(true)
    }

    async fn admin_advance_block(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.advance_block();
        Ok(state.block_info())
    }

    async fn admin_set_timestamp(&self, timestamp: u64) -> Result<bool, ErrorObjectOwned> {
        let mut state = self.state.write();
        state.set_timestamp(timestamp);
        info!("Timestamp set to {}", timestamp);
        Ok(true)
    }

    async fn admin_advance_time(&self, seconds: u64) -> Result<BlockInfo, ErrorObjectOwned> {
        let mut state = self.state.write();
        let timestamp = state
            .timestamp
            .checked_add(seconds)
            .ok_or_else(|| Self::rpc_error("Timestamp overflow"))?;
        state.set_timestamp(timestamp);
        info!(seconds, timestamp, "Time advanced");
        Ok(state.block_info())
    }

    async fn auction_start(
        &self,
        sender: String,
        resource_name: String,
    ) -> Result<AuctionSummaryRpc, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = state.context(parse_address(&sender)?, 0);

        handlers::handle_start_auction(&mut state.module, &ctx, &resource_name)
            .map_err(|e| Self::call_error("start auction", e))?;

        match state.query(AuctionQuery::GetAuction { resource_name }) {
            AuctionQueryResponse::Auction(Some(summary)) => Ok(summary.into()),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn auction_submit_bid(&self, params: SubmitBidParams) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = state.context(parse_address(&params.sender)?, params.deposit);
        let digest = parse_digest(&params.digest)?;

        let event =
            handlers::handle_submit_bid(&mut state.module, &ctx, &params.resource_name, digest)
                .map_err(|e| Self::call_error("submit bid", e))?;

        match event {
            AuctionEvent::BidPlaced { total_deposit, .. } => Ok(total_deposit),
            _ => Ok(params.deposit),
        }
    }

    async fn auction_reveal(
        &self,
        params: RevealParams,
    ) -> Result<RevealResultRpc, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = state.context(parse_address(&params.sender)?, 0);

        let secrets = params
            .secrets
            .iter()
            .map(|s| parse_secret(s))
            .collect::<Result<Vec<_>, _>>()?;
        let entries = RevealEntry::zip(&params.amounts, &params.genuine, &secrets).ok_or_else(|| {
            Self::call_error(
                "reveal",
                AuctionError::MalformedReveal(
                    "amounts, genuine flags and secrets differ in length".into(),
                ),
            )
        })?;

        let report =
            handlers::handle_reveal(&mut state.module, &ctx, &params.resource_name, &entries)
                .map_err(|e| Self::call_error("reveal", e))?;

        Ok(RevealResultRpc::from(&report))
    }

    async fn auction_finalize(
        &self,
        sender: String,
        resource_name: String,
    ) -> Result<AuctionResultRpc, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = state.context(parse_address(&sender)?, 0);

        handlers::handle_finalize(&mut state.module, &ctx, &resource_name)
            .map_err(|e| Self::call_error("finalize", e))?;

        match state.query(AuctionQuery::GetResult { resource_name }) {
            AuctionQueryResponse::Result(Some(result)) => Ok(result.into()),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn auction_withdraw(
        &self,
        sender: String,
        resource_name: String,
    ) -> Result<u64, ErrorObjectOwned> {
        let mut state = self.state.write();
        let ctx = state.context(parse_address(&sender)?, 0);

        let event = handlers::handle_withdraw(&mut state.module, &ctx, &resource_name)
            .map_err(|e| Self::call_error("withdraw", e))?;

        match event {
            AuctionEvent::Withdrawn { amount, .. } => Ok(amount),
            _ => Ok(0),
        }
    }

    async fn chain_get_block_info(&self) -> Result<BlockInfo, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state.block_info())
    }

    async fn query_get_auction(
        &self,
        resource_name: String,
    ) -> Result<Option<AuctionSummaryRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        match state.query(AuctionQuery::GetAuction { resource_name }) {
            AuctionQueryResponse::Auction(summary) => Ok(summary.map(Into::into)),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_list_auctions(&self) -> Result<Vec<AuctionSummaryRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        let query = AuctionQuery::ListAuctions {
            offset: 0,
            limit: u64::MAX,
        };
        match state.query(query) {
            AuctionQueryResponse::AuctionList(list) => {
                Ok(list.into_iter().map(Into::into).collect())
            }
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_get_pending_finalization(&self) -> Result<Vec<String>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(auction_module::queries::get_pending_finalization(
            &state.module,
            state.timestamp,
        ))
    }

    async fn query_get_commitments(
        &self,
        resource_name: String,
        bidder: String,
    ) -> Result<Vec<CommitmentRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        let bidder = parse_address(&bidder)?;
        match state.query(AuctionQuery::GetCommitments {
            resource_name,
            bidder,
        }) {
            AuctionQueryResponse::Commitments(list) => {
                Ok(list.iter().map(CommitmentRpc::from).collect())
            }
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_get_pending_refund(
        &self,
        resource_name: String,
        bidder: String,
    ) -> Result<u64, ErrorObjectOwned> {
        let state = self.state.read();
        let bidder = parse_address(&bidder)?;
        match state.query(AuctionQuery::GetPendingRefund {
            resource_name,
            bidder,
        }) {
            AuctionQueryResponse::PendingRefund(amount) => Ok(amount),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_get_result(
        &self,
        resource_name: String,
    ) -> Result<Option<AuctionResultRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        match state.query(AuctionQuery::GetResult { resource_name }) {
            AuctionQueryResponse::Result(result) => Ok(result.map(Into::into)),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_resolve(
        &self,
        resource_name: String,
    ) -> Result<Option<String>, ErrorObjectOwned> {
        let state = self.state.read();
        match state.query(AuctionQuery::Resolve { resource_name }) {
            AuctionQueryResponse::Owner(owner) => Ok(owner.map(hex::encode)),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_get_domains(&self, owner: String) -> Result<Vec<String>, ErrorObjectOwned> {
        let state = self.state.read();
        let owner = parse_address(&owner)?;
        match state.query(AuctionQuery::GetDomains { owner }) {
            AuctionQueryResponse::Domains(domains) => Ok(domains),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_list_owners(&self) -> Result<Vec<OwnerListingRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        match state.query(AuctionQuery::ListOwners) {
            AuctionQueryResponse::Owners(owners) => {
                Ok(owners.into_iter().map(Into::into).collect())
            }
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_get_balance(&self, address: String) -> Result<u64, ErrorObjectOwned> {
        let state = self.state.read();
        let address = parse_address(&address)?;
        match state.query(AuctionQuery::GetBalance { address }) {
            AuctionQueryResponse::Balance(balance) => Ok(balance),
            other => Err(Self::unexpected(other)),
        }
    }

    async fn query_get_events(
        &self,
        resource_name: String,
    ) -> Result<Vec<EventRpc>, ErrorObjectOwned> {
        let state = self.state.read();
        Ok(state
            .module
            .events
            .iter()
            .filter(|record| record.resource_name == resource_name)
            .map(|record| EventRpc::new(record.timestamp, &record.event))
            .collect())
    }
}

/// Overlay RPC genesis fields on an existing configuration.
fn merge_genesis(
    base: &AuctionGenesisConfig,
    config: &GenesisConfigRpc,
) -> Result<AuctionGenesisConfig, ErrorObjectOwned> {
    let mut genesis = base.clone();
    if let Some(addr) = &config.registry_address {
        genesis.registry_address = parse_address(addr)?;
    }
    if let Some(bidding_time) = config.bidding_time {
        genesis.default_params.bidding_time = bidding_time;
    }
    if let Some(reveal_time) = config.reveal_time {
        genesis.default_params.reveal_time = reveal_time;
    }
    Ok(genesis)
}

fn decode_hex(s: &str, what: &str) -> Result<Vec<u8>, ErrorObjectOwned> {
    hex::decode(s.trim_start_matches("0x"))
        .map_err(|e| MockChainServer::rpc_error(&format!("Invalid {} hex: {}", what, e)))
}

/// Parse a hex address. Shorter inputs are right-padded with zeros.
fn parse_address(s: &str) -> Result<Address, ErrorObjectOwned> {
    let bytes = decode_hex(s, "address")?;
    if bytes.len() > 32 {
        return Err(MockChainServer::rpc_error("Address must be at most 32 bytes"));
    }
    let mut addr = [0u8; 32];
    addr[..bytes.len()].copy_from_slice(&bytes);
    Ok(addr)
}

fn parse_digest(s: &str) -> Result<BidDigest, ErrorObjectOwned> {
    let bytes: [u8; 32] = decode_hex(s, "digest")?
        .try_into()
        .map_err(|_| MockChainServer::rpc_error("Digest must be 32 bytes"))?;
    Ok(BidDigest(bytes))
}

fn parse_secret(s: &str) -> Result<Secret, ErrorObjectOwned> {
    let bytes = decode_hex(s, "secret")?;
    Secret::from_slice(&bytes).map_err(|e| MockChainServer::rpc_error(&e.to_string()))
}

#[derive(Parser)]
#[command(name = "mock-chain")]
#[command(about = "JSON-RPC mock chain for sealed-bid domain auctions")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:9944")]
    listen: SocketAddr,

    /// Genesis JSON file (registry_address, bidding_time, reveal_time, initial_timestamp)
    #[arg(long)]
    genesis: Option<PathBuf>,
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

    let config = match &args.genesis {
        Some(path) => {
            info!("Loading genesis from {}", path.display());
            serde_json::from_str::<GenesisConfigRpc>(&std::fs::read_to_string(path)?)?
        }
        None => GenesisConfigRpc::default(),
    };
    let genesis = merge_genesis(&AuctionGenesisConfig::default(), &config)
        .map_err(|e| anyhow::anyhow!(e.message().to_string()))?;
    let chain = ChainState::new(genesis, config.initial_timestamp.unwrap_or(0))?;

    info!(
        registry = %hex::encode(chain.genesis.registry_address),
        bidding_time = chain.genesis.default_params.bidding_time,
        reveal_time = chain.genesis.default_params.reveal_time,
        "Starting mock chain server on {}",
        args.listen
    );

    let server = Server::builder().build(args.listen).await?;
    let handle = server.start(MockChainServer::new(chain).into_rpc());

    info!("Mock chain server running. Press Ctrl+C to stop.");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
