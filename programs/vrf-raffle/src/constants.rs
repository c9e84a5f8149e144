/// Seed of the singleton raffle PDA.
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Seed prefix of the treasury PDA, followed by the raffle key.
pub const TREASURY_SEED: &[u8] = b"treasury";

/// Block confirmations the oracle waits for before answering a request.
pub const REQUEST_CONFIRMATIONS: u16 = 3;

/// One word is enough to pick a single winner.
pub const NUM_WORDS: u32 = 1;

/// Entry slots reserved in the raffle account. Account space is fixed at
/// initialization, so the pool cannot grow past this.
pub const MAX_PLAYERS: usize = 200;
