//! End-to-end integration tests for the escrow auction system.
//!
//! These tests exercise the full auction lifecycle through the client SDK
//! and the engine over an in-memory ledger:
//! 1. Address derivation for a fresh auction
//! 2. Initialization with a treasury deposit
//! 3. Start and a sequence of bids
//! 4. End with the chest split
//! 5. Treasury claim

#[cfg(test)]
mod tests {
    use auction_client::AuctionSetup;
    use auction_module::{
        AuctionCall, AuctionEngine, AuctionError, AuctionEvent, AuctionGenesisConfig, CallContext,
        CallOutcome, FeeSchedule, InMemoryLedger, Ledger,
    };
    use auction_pda::find_program_address;
    use auction_types::{Address, LifecycleState, BASE_UNITS_PER_UNIT, NO_BIDDER};
    use rand::rngs::StdRng;
    use rand::{Rng, RngCore, SeedableRng};

    const NOW_MS: i64 = 1_700_000_000_000;

    struct Harness {
        engine: AuctionEngine<InMemoryLedger>,
        setup: AuctionSetup,
        /// Receives the treasury share of the chest at `end`
        fee_collector: Address,
        rng: StdRng,
    }

    impl Harness {
        fn new(seed: u64) -> Self {
            let mut rng = StdRng::seed_from_u64(seed);
            let creator = random_address(&mut rng);
            let mint = random_address(&mut rng);
            let fee_collector = random_address(&mut rng);

            let mut ledger = InMemoryLedger::new();
            ledger.airdrop(creator, 10 * BASE_UNITS_PER_UNIT).unwrap();

            let engine = AuctionEngine::new(ledger, AuctionGenesisConfig::default()).unwrap();
            let setup = AuctionSetup::derive(*engine.program_id(), creator, mint, NOW_MS).unwrap();
            Self {
                engine,
                setup,
                fee_collector,
                rng,
            }
        }

        fn creator(&self) -> Address {
            self.setup.creator
        }

        fn funded_bidder(&mut self, lamports: u64) -> Address {
            let bidder = random_address(&mut self.rng);
            self.engine.ledger_mut().airdrop(bidder, lamports).unwrap();
            bidder
        }

        fn version(&self) -> u64 {
            self.engine.auction(self.setup.auction()).unwrap().version
        }

        fn balance(&self, address: &Address) -> u64 {
            self.engine.ledger().balance(address)
        }

        fn call(&mut self, sender: Address, call: AuctionCall) -> Result<CallOutcome, AuctionError> {
            self.engine.execute(&CallContext::new(sender), call)
        }

        fn initialize(&mut self, deposit: u64) -> Result<CallOutcome, AuctionError> {
            let call = self.setup.initialize_call(deposit, None);
            self.call(self.creator(), call)
        }

        fn start(&mut self) -> Result<CallOutcome, AuctionError> {
            let call = self.setup.start_call(self.version());
            self.call(self.creator(), call)
        }

        fn bid(&mut self, bidder: Address, ts: i64) -> Result<CallOutcome, AuctionError> {
            let prepared = self
                .setup
                .bid(bidder)
                .timestamp(ts)
                .expected_version(self.version())
                .build()
                .unwrap();
            self.call(bidder, prepared.call)
        }

        fn end(&mut self) -> Result<CallOutcome, AuctionError> {
            let call = self.setup.end_call(self.version(), self.fee_collector);
            self.call(self.creator(), call)
        }

        fn claim(&mut self, sender: Address) -> Result<CallOutcome, AuctionError> {
            let call = self.setup.claim_call(self.version(), sender);
            self.call(sender, call)
        }
    }

    fn random_address(rng: &mut impl RngCore) -> Address {
        let mut address = [0u8; 32];
        rng.fill_bytes(&mut address);
        address
    }

    #[test]
    fn test_full_auction_flow() {
        let mut h = Harness::new(1);
        let creator = h.creator();
        let chest = h.setup.addresses.bidders_chest;
        let treasury = h.setup.addresses.treasury;

        // Deposit 3 units, starting price 0.15
        let outcome = h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        assert!(matches!(
            outcome,
            CallOutcome::Initialized(ref a) if a.starting_price == 150_000_000 && a.next_bid == 150_000_000
        ));
        assert_eq!(h.balance(&treasury), 3 * BASE_UNITS_PER_UNIT);
        h.start().unwrap();

        let alice = h.funded_bidder(BASE_UNITS_PER_UNIT);
        let bob = h.funded_bidder(BASE_UNITS_PER_UNIT);

        h.bid(alice, 1).unwrap();
        let auction = h.engine.auction(h.setup.auction()).unwrap().auction;
        assert_eq!(auction.next_bid, 157_500_000);

        h.bid(bob, 2).unwrap();
        assert_eq!(h.balance(&chest), 307_500_000);

        let creator_before = h.balance(&creator);
        match h.end().unwrap() {
            CallOutcome::Ended(result) => {
                assert_eq!(result.creator_gain, 230_625_000);
                assert_eq!(result.treasury_gain, 76_875_000);
                assert_eq!(result.winner, Some(bob));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(h.balance(&chest), 0);
        assert_eq!(h.balance(&creator), creator_before + 230_625_000);
        assert_eq!(h.balance(&h.fee_collector), 76_875_000);
        assert_eq!(h.balance(&treasury), 3 * BASE_UNITS_PER_UNIT);

        let auction = h.engine.auction(h.setup.auction()).unwrap().auction;
        assert_eq!(auction.state, LifecycleState::Ended);
        assert_eq!(auction.last_bidder, bob);
        assert_eq!(auction.bid_count, 2);

        // Winner takes the escrowed deposit
        let bob_before = h.balance(&bob);
        let claimed = h.claim(bob).unwrap();
        assert_eq!(
            claimed,
            CallOutcome::Claimed {
                amount: 3 * BASE_UNITS_PER_UNIT
            }
        );
        assert_eq!(h.balance(&bob), bob_before + 3 * BASE_UNITS_PER_UNIT);
        assert_eq!(h.balance(&treasury), 0);
        assert_eq!(h.balance(&h.fee_collector), 76_875_000);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let a = Harness::new(7);
        let b = Harness::new(7);
        assert_eq!(a.setup, b.setup);

        let seeds: [&[u8]; 2] = [b"auction", &a.setup.creator];
        let first = find_program_address(&seeds, a.engine.program_id()).unwrap();
        let second = find_program_address(&seeds, a.engine.program_id()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bid_premium_sequence() {
        let mut h = Harness::new(2);
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        h.start().unwrap();

        // 173_643_750 * 1.05 = 182_325_937.5 rounds up on the fifth bid
        let ladder: [u64; 10] = [
            150_000_000,
            157_500_000,
            165_375_000,
            173_643_750,
            182_325_938,
            191_442_235,
            201_014_347,
            211_065_064,
            221_618_317,
            232_699_233,
        ];
        for (k, expected) in ladder.iter().enumerate() {
            let bidder = h.funded_bidder(BASE_UNITS_PER_UNIT);
            match h.bid(bidder, k as i64).unwrap() {
                CallOutcome::BidPlaced(record) => {
                    assert_eq!(record.bid_value, *expected, "bid {}", k + 1);
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        let auction = h.engine.auction(h.setup.auction()).unwrap().auction;
        assert_eq!(auction.next_bid, 244_334_195);

        let bids = h
            .engine
            .query(auction_module::AuctionQuery::GetAuctionBids {
                auction: *h.setup.auction(),
            });
        assert!(matches!(bids, auction_module::AuctionQueryResponse::Bids(ref b) if b.len() == 10));
    }

    #[test]
    fn test_conservation_on_random_bids() {
        let mut h = Harness::new(3);
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        h.start().unwrap();
        let chest = h.setup.addresses.bidders_chest;

        let mut expected_chest = 0u64;
        for _ in 0..8 {
            let bidder = h.funded_bidder(BASE_UNITS_PER_UNIT);
            let ts = h.rng.gen_range(0..i64::MAX);
            let before = h.balance(&bidder);
            let price = h.engine.auction(h.setup.auction()).unwrap().auction.next_bid;

            h.bid(bidder, ts).unwrap();
            expected_chest += price;

            assert_eq!(h.balance(&bidder), before - price);
            assert_eq!(h.balance(&chest), expected_chest);
        }

        let result = match h.end().unwrap() {
            CallOutcome::Ended(result) => result,
            other => panic!("unexpected outcome: {other:?}"),
        };
        assert_eq!(result.total, expected_chest);
        assert_eq!(result.creator_gain + result.treasury_gain, expected_chest);
        assert_eq!(h.balance(&chest), 0);
    }

    #[test]
    fn test_split_rounds_toward_treasury() {
        let fees = FeeSchedule::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let total: u64 = rng.gen_range(0..10 * BASE_UNITS_PER_UNIT);
            let split = fees.split(total);
            assert_eq!(split.creator_gain + split.treasury_gain, total);
            assert_eq!(split.creator_gain, total * 3 / 4);
        }
    }

    #[test]
    fn test_state_machine_safety() {
        let mut h = Harness::new(4);
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        let alice = h.funded_bidder(BASE_UNITS_PER_UNIT);

        assert!(matches!(
            h.bid(alice, 1),
            Err(AuctionError::AuctionNotStarted(LifecycleState::Created))
        ));

        let call = h.setup.start_call(h.version());
        assert_eq!(h.call(alice, call), Err(AuctionError::Unauthorized));

        h.start().unwrap();
        h.end().unwrap();
        assert!(matches!(
            h.end(),
            Err(AuctionError::InvalidStateTransition {
                from: LifecycleState::Ended,
                to: LifecycleState::Ended,
            })
        ));
        assert!(matches!(
            h.bid(alice, 2),
            Err(AuctionError::AuctionNotStarted(LifecycleState::Ended))
        ));
    }

    #[test]
    fn test_duplicate_bid_collides() {
        let mut h = Harness::new(5);
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        h.start().unwrap();
        let alice = h.funded_bidder(BASE_UNITS_PER_UNIT);

        h.bid(alice, 99).unwrap();
        let before = h.balance(&alice);
        assert!(matches!(h.bid(alice, 99), Err(AuctionError::DuplicateBid(_))));
        assert_eq!(h.balance(&alice), before);
    }

    #[test]
    fn test_concurrent_bidders_one_wins_the_version() {
        let mut h = Harness::new(6);
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        h.start().unwrap();
        let alice = h.funded_bidder(BASE_UNITS_PER_UNIT);
        let bob = h.funded_bidder(BASE_UNITS_PER_UNIT);

        // Both price their bid against the same version
        let version = h.version();
        let bid_a = h.setup.bid(alice).timestamp(1).expected_version(version).build().unwrap();
        let bid_b = h.setup.bid(bob).timestamp(1).expected_version(version).build().unwrap();

        h.call(alice, bid_a.call).unwrap();
        assert!(matches!(
            h.call(bob, bid_b.call),
            Err(AuctionError::StaleState { .. })
        ));

        // Bob refreshes and retries at the new price
        match h.bid(bob, 1).unwrap() {
            CallOutcome::BidPlaced(record) => assert_eq!(record.bid_value, 157_500_000),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_zero_bid_auction_returns_deposit() {
        let mut h = Harness::new(8);
        let creator = h.creator();
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        h.start().unwrap();

        match h.end().unwrap() {
            CallOutcome::Ended(result) => {
                assert_eq!(result.total, 0);
                assert_eq!(result.winner, None);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        let auction = h.engine.auction(h.setup.auction()).unwrap().auction;
        assert_eq!(auction.last_bidder, NO_BIDDER);

        h.claim(creator).unwrap();
        assert_eq!(h.balance(&creator), 10 * BASE_UNITS_PER_UNIT);
        assert_eq!(h.claim(creator), Err(AuctionError::AlreadyClaimed));
    }

    #[test]
    fn test_failed_call_leaves_ledger_untouched() {
        let mut h = Harness::new(10);
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        h.start().unwrap();
        let slot = h.engine.ledger().slot();

        let poor = h.funded_bidder(1_000);
        assert!(matches!(
            h.bid(poor, 1),
            Err(AuctionError::InsufficientFunds { .. })
        ));
        // Only the airdrop moved; no transaction was committed
        assert_eq!(h.engine.ledger().slot(), slot);
        assert_eq!(h.balance(&poor), 1_000);
    }

    #[test]
    fn test_event_log_tracks_lifecycle() {
        let mut h = Harness::new(11);
        h.initialize(3 * BASE_UNITS_PER_UNIT).unwrap();
        h.start().unwrap();
        let alice = h.funded_bidder(BASE_UNITS_PER_UNIT);
        h.bid(alice, 5).unwrap();
        h.end().unwrap();
        h.claim(alice).unwrap();

        let labels: Vec<&'static str> = h
            .engine
            .ledger()
            .logs()
            .iter()
            .flat_map(|log| log.lines.iter())
            .filter_map(|line| AuctionEvent::from_log_line(line))
            .map(|event| match event {
                AuctionEvent::Initialized { .. } => "initialized",
                AuctionEvent::Started { .. } => "started",
                AuctionEvent::BidPlaced { .. } => "bid_placed",
                AuctionEvent::Ended { .. } => "ended",
                AuctionEvent::Claimed { .. } => "claimed",
            })
            .collect();
        assert_eq!(
            labels,
            vec!["initialized", "started", "bid_placed", "ended", "claimed"]
        );
    }
}
