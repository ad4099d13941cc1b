//! # Demo Subcommand
//!
//! Runs a scripted sealed-bid round end to end against the in-memory
//! engine: registers eligible participants in a sentinel-linked set,
//! commits a digest per participant with a random secret, advances the
//! logical clock past the commit deadline, reveals, and reports the
//! highest revealed bid.
//!
//! The round is driven by a [`ManualClock`] so every timing rule in the
//! engine is exercised deterministically regardless of wall-clock time.

use clap::Args;
use rand::Rng;

use veil_coordinator::{CommitReveal, PhaseSchedule};
use veil_core::address::ADDRESS_WIDTH;
use veil_core::{Address, Clock, HashOracle, ManualClock, Sha256Oracle, Tick};
use veil_registry::SentinelSet;

/// Arguments for the demo subcommand.
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Number of bidders in the round.
    #[arg(long, default_value_t = 3)]
    pub bidders: u8,

    /// Commit-phase deadline in ticks.
    #[arg(long, default_value_t = 100)]
    pub deadline: u64,

    /// Maximum commitment age in ticks.
    #[arg(long, default_value_t = 1000)]
    pub max_age: u64,
}

/// One scripted bidder: an address, a bid, and a freshly drawn secret.
struct Bidder {
    address: Address,
    bid: u64,
    secret: [u8; 16],
}

/// Run the scripted round.
pub fn run(args: DemoArgs) -> anyhow::Result<()> {
    if args.bidders == 0 {
        anyhow::bail!("at least one bidder is required");
    }

    let schedule = PhaseSchedule::new(
        Tick::new(args.deadline),
        Tick::new(args.deadline),
        args.max_age,
    )?;
    let mut engine = CommitReveal::with_sha256(schedule);
    let mut eligible: SentinelSet<Address> = SentinelSet::for_addresses();
    let mut clock = ManualClock::starting_at(Tick::new(1));
    let mut rng = rand::thread_rng();

    // Eligibility registration, then one commit per bidder. Counters live
    // in the last byte only, so no derived address ever collides with the
    // reserved all-zero or all-one values.
    let mut bidders = Vec::new();
    for i in 0..args.bidders {
        let mut bytes = [0u8; ADDRESS_WIDTH];
        bytes[ADDRESS_WIDTH - 1] = i + 1;
        let address = Address::from_bytes(bytes);
        eligible.insert(address)?;
        let bidder = Bidder {
            address,
            bid: rng.gen_range(100..10_000),
            secret: rng.gen(),
        };
        let digest = Sha256Oracle
            .commitment_digest(bidder.bid.to_be_bytes().as_slice(), &bidder.secret);
        engine.commit(address, digest, clock.now())?;
        tracing::info!(participant = %address, tick = %clock.now(), "commitment accepted");
        bidders.push(bidder);
    }
    tracing::info!(
        outstanding = engine.outstanding_len(),
        eligible = eligible.len(),
        "commit phase complete"
    );

    // Wait out the commit window.
    clock.set(Tick::new(args.deadline))?;
    tracing::info!(tick = %clock.now(), "reveal phase open");

    // Reveals: each bidder discloses its pair; the engine checks the digest.
    let mut best: Option<(Address, u64)> = None;
    for bidder in &bidders {
        let value = engine.reveal(
            bidder.address,
            bidder.bid.to_be_bytes().as_slice(),
            &bidder.secret,
            clock.now(),
        )?;
        let raw: [u8; 8] = value.as_slice().try_into()?;
        let bid = u64::from_be_bytes(raw);
        tracing::info!(participant = %bidder.address, bid, "reveal accepted");
        if best.map_or(true, |(_, b)| bid > b) {
            best = Some((bidder.address, bid));
        }
        clock.advance(1);
    }

    if let Some((winner, bid)) = best {
        println!("winner: {winner} with bid {bid}");
    }
    println!(
        "events: {}",
        serde_json::to_string_pretty(&engine.events())?
    );
    Ok(())
}
