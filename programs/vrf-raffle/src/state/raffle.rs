use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_PLAYERS, NUM_WORDS, REQUEST_CONFIRMATIONS},
    error::RaffleError,
    oracle::{reduce_word, RandomWord, RandomWordsRequest, RandomnessOracle, RequestId},
    payout::{PendingPayout, PrizeVault},
};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum RaffleState {
    /// Accepting entries; a draw may be requested once the interval elapses.
    Open,
    /// Waiting on the oracle. Entries and new draws are refused.
    Calculating,
}

impl RaffleState {
    pub fn is_open(self) -> bool {
        match self {
            RaffleState::Open => true,
            RaffleState::Calculating => false,
        }
    }
}

/// Construction-time parameters. None of them change afterwards.
#[derive(Clone, Debug)]
pub struct RaffleConfig {
    pub authority: Pubkey,
    pub oracle: Pubkey,
    pub treasury: Pubkey,
    pub entrance_fee: u64,
    pub interval: u64,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub callback_compute_limit: u32,
}

/// The raffle aggregate. Fields are private so that every change goes
/// through one of the operations below.
#[account]
#[derive(InitSpace, Debug, PartialEq)]
pub struct Raffle {
    authority: Pubkey,
    oracle: Pubkey,
    treasury: Pubkey,
    entrance_fee: u64,
    /// Minimum seconds between draws.
    interval: u64,
    key_hash: [u8; 32],
    subscription_id: u64,
    callback_compute_limit: u32,
    raffle_state: RaffleState,
    last_timestamp: i64,
    recent_winner: Option<Pubkey>,
    /// Only set while `raffle_state` is `Calculating`.
    pending_request: Option<[u8; 32]>,
    request_nonce: u64,
    bump: u8,
    /// Entry order. One slot per entry, so repeat entrants get proportional odds.
    #[max_len(MAX_PLAYERS)]
    players: Vec<Pubkey>,
}

impl Raffle {
    pub fn new(config: RaffleConfig, now: i64, bump: u8) -> Self {
        Self {
            authority: config.authority,
            oracle: config.oracle,
            treasury: config.treasury,
            entrance_fee: config.entrance_fee,
            interval: config.interval,
            key_hash: config.key_hash,
            subscription_id: config.subscription_id,
            callback_compute_limit: config.callback_compute_limit,
            raffle_state: RaffleState::Open,
            last_timestamp: now,
            recent_winner: None,
            pending_request: None,
            request_nonce: 0,
            bump,
            players: Vec::new(),
        }
    }

    /// Adds `player` to the pool. The caller is responsible for moving
    /// `payment` into the treasury in the same transaction.
    pub fn enter(&mut self, player: Pubkey, payment: u64) -> Result<()> {
        require!(payment >= self.entrance_fee, RaffleError::NotEnoughPayment);
        require!(self.raffle_state.is_open(), RaffleError::RaffleNotOpen);
        require!(self.players.len() < MAX_PLAYERS, RaffleError::RaffleFull);

        self.players.push(player);
        Ok(())
    }

    /// Whether `request_draw` would go through, given the lamports currently
    /// held for the prize. Funding of the oracle subscription is not visible
    /// here and is left to whoever triggers the draw.
    pub fn check_draw_ready(&self, now: i64, balance: u64) -> bool {
        self.interval_elapsed(now)
            && self.raffle_state.is_open()
            && balance > 0
            && !self.players.is_empty()
    }

    /// Closes the pool and asks the oracle for randomness. Funds stay put
    /// until the oracle answers.
    pub fn request_draw<O: RandomnessOracle>(&mut self, now: i64, oracle: &mut O) -> Result<RequestId> {
        require!(self.interval_elapsed(now), RaffleError::NotEnoughTimePassed);
        require!(self.raffle_state.is_open(), RaffleError::RaffleNotOpen);
        require!(!self.players.is_empty(), RaffleError::NoPlayers);

        let request = RandomWordsRequest {
            key_hash: self.key_hash,
            subscription_id: self.subscription_id,
            request_confirmations: REQUEST_CONFIRMATIONS,
            callback_compute_limit: self.callback_compute_limit,
            num_words: NUM_WORDS,
            nonce: self.request_nonce,
        };
        let next_nonce = self
            .request_nonce
            .checked_add(1)
            .ok_or(RaffleError::Overflow)?;

        self.raffle_state = RaffleState::Calculating;
        let request_id = match oracle.request_random_words(&request) {
            Ok(request_id) => request_id,
            Err(err) => {
                self.raffle_state = RaffleState::Open;
                return Err(err);
            }
        };

        self.pending_request = Some(request_id);
        self.request_nonce = next_nonce;
        Ok(request_id)
    }

    /// Validates an oracle answer against the pending request and picks the
    /// winner it points at. Does not modify anything.
    pub fn select_winner(&self, request_id: RequestId, words: &[RandomWord]) -> Result<Pubkey> {
        match self.raffle_state {
            RaffleState::Calculating => {}
            RaffleState::Open => return err!(RaffleError::RequestIdMismatch),
        }
        require!(
            self.pending_request == Some(request_id),
            RaffleError::RequestIdMismatch
        );

        let word = words.first().ok_or(RaffleError::NoRandomWords)?;
        let index = reduce_word(word, self.players.len() as u64).ok_or(RaffleError::NoPlayers)?;

        self.players
            .get(index as usize)
            .copied()
            .ok_or_else(|| error!(RaffleError::NoPlayers))
    }

    /// Applies every internal effect of a fulfilled draw and hands back the
    /// transfer still to be made. `balance` is the whole prize.
    pub fn settle_draw(
        &mut self,
        request_id: RequestId,
        words: &[RandomWord],
        now: i64,
        balance: u64,
    ) -> Result<PendingPayout> {
        let winner = self.select_winner(request_id, words)?;
        let snapshot = self.clone();

        self.recent_winner = Some(winner);
        self.raffle_state = RaffleState::Open;
        self.players.clear();
        self.last_timestamp = now;
        self.pending_request = None;

        Ok(PendingPayout::new(winner, balance, snapshot))
    }

    /// Settles the draw and pays the winner everything `vault` holds. Either
    /// both happen or the raffle is left untouched.
    pub fn fulfill<V: PrizeVault>(
        &mut self,
        request_id: RequestId,
        words: &[RandomWord],
        now: i64,
        vault: &mut V,
    ) -> Result<Pubkey> {
        let payout = self.settle_draw(request_id, words, now, vault.held())?;
        payout.execute(self, vault)
    }

    fn interval_elapsed(&self, now: i64) -> bool {
        let elapsed = u64::try_from(now.saturating_sub(self.last_timestamp)).unwrap_or(0);
        elapsed >= self.interval
    }

    pub fn authority(&self) -> Pubkey {
        self.authority
    }

    pub fn oracle(&self) -> Pubkey {
        self.oracle
    }

    pub fn treasury(&self) -> Pubkey {
        self.treasury
    }

    pub fn entrance_fee(&self) -> u64 {
        self.entrance_fee
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }

    pub fn raffle_state(&self) -> RaffleState {
        self.raffle_state
    }

    pub fn last_timestamp(&self) -> i64 {
        self.last_timestamp
    }

    pub fn recent_winner(&self) -> Option<Pubkey> {
        self.recent_winner
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending_request
    }

    pub fn bump(&self) -> u8 {
        self.bump
    }

    pub fn player(&self, index: usize) -> Option<Pubkey> {
        self.players.get(index).copied()
    }

    pub fn players(&self) -> &[Pubkey] {
        &self.players
    }

    pub fn number_of_players(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::oracle::word_from_u64;

    pub const START: i64 = 1_700_000_000;
    pub const FEE: u64 = 100;
    pub const INTERVAL: u64 = 30;

    #[derive(Default)]
    pub struct MockOracle {
        pub requests: Vec<RandomWordsRequest>,
        pub fail: bool,
    }

    impl RandomnessOracle for MockOracle {
        fn request_random_words(&mut self, request: &RandomWordsRequest) -> Result<RequestId> {
            if self.fail {
                return err!(RaffleError::Overflow);
            }
            self.requests.push(request.clone());
            Ok(word_from_u64(self.requests.len() as u64))
        }
    }

    pub struct MockVault {
        pub held: u64,
        pub paid: Vec<(Pubkey, u64)>,
    }

    impl PrizeVault for MockVault {
        fn held(&self) -> u64 {
            self.held
        }

        fn release(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
            self.held = self.held.checked_sub(amount).ok_or(RaffleError::TransferFailed)?;
            self.paid.push((*to, amount));
            Ok(())
        }
    }

    pub fn config() -> RaffleConfig {
        RaffleConfig {
            authority: Pubkey::new_unique(),
            oracle: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
            entrance_fee: FEE,
            interval: INTERVAL,
            key_hash: [9; 32],
            subscription_id: 77,
            callback_compute_limit: 500_000,
        }
    }

    pub fn raffle_with_players(count: usize) -> (Raffle, Vec<Pubkey>) {
        let mut raffle = Raffle::new(config(), START, 255);
        let players: Vec<Pubkey> = (0..count).map(|_| Pubkey::new_unique()).collect();
        for player in &players {
            raffle.enter(*player, FEE).unwrap();
        }
        (raffle, players)
    }

    fn code(err: RaffleError) -> anchor_lang::error::Error {
        err.into()
    }

    #[test]
    fn new_raffle_starts_open_and_empty() {
        let raffle = Raffle::new(config(), START, 254);

        assert_eq!(raffle.raffle_state(), RaffleState::Open);
        assert_eq!(raffle.last_timestamp(), START);
        assert_eq!(raffle.number_of_players(), 0);
        assert_eq!(raffle.recent_winner(), None);
        assert_eq!(raffle.pending_request(), None);
        assert_eq!(raffle.entrance_fee(), FEE);
        assert_eq!(raffle.interval(), INTERVAL);
        assert_eq!(raffle.bump(), 254);
    }

    #[test]
    fn account_space_covers_every_player_slot() {
        let fixed = 32 * 3 + 8 + 8 + 32 + 8 + 4 + 1 + 8 + 33 + 33 + 8 + 1;
        assert_eq!(Raffle::INIT_SPACE, fixed + 4 + 32 * MAX_PLAYERS);
    }

    #[test]
    fn underpayment_is_rejected_without_entering() {
        let (mut raffle, _) = raffle_with_players(1);

        for payment in [0, 1, FEE - 1] {
            let err = raffle.enter(Pubkey::new_unique(), payment).unwrap_err();
            assert_eq!(err, code(RaffleError::NotEnoughPayment));
        }
        assert_eq!(raffle.number_of_players(), 1);
    }

    #[test]
    fn entries_append_in_order_and_allow_repeats() {
        let mut raffle = Raffle::new(config(), START, 255);
        let alice = Pubkey::new_unique();
        let bob = Pubkey::new_unique();

        raffle.enter(alice, FEE).unwrap();
        raffle.enter(bob, FEE * 3).unwrap();
        raffle.enter(alice, FEE).unwrap();

        assert_eq!(raffle.players(), &[alice, bob, alice]);
        assert_eq!(raffle.player(1), Some(bob));
        assert_eq!(raffle.player(3), None);
    }

    #[test]
    fn pool_is_capped() {
        let (mut raffle, _) = raffle_with_players(MAX_PLAYERS);

        let err = raffle.enter(Pubkey::new_unique(), FEE).unwrap_err();
        assert_eq!(err, code(RaffleError::RaffleFull));
        assert_eq!(raffle.number_of_players(), MAX_PLAYERS);
    }

    #[test]
    fn draw_is_refused_before_the_interval() {
        let (mut raffle, _) = raffle_with_players(2);
        let mut oracle = MockOracle::default();

        for now in [START, START + INTERVAL as i64 - 1, START - 100] {
            let err = raffle.request_draw(now, &mut oracle).unwrap_err();
            assert_eq!(err, code(RaffleError::NotEnoughTimePassed));
        }

        let mut empty = Raffle::new(config(), START, 255);
        let err = empty.request_draw(START + 1, &mut oracle).unwrap_err();
        assert_eq!(err, code(RaffleError::NotEnoughTimePassed));

        assert!(oracle.requests.is_empty());
        assert_eq!(raffle.raffle_state(), RaffleState::Open);
    }

    #[test]
    fn draw_is_refused_with_an_empty_pool() {
        let mut raffle = Raffle::new(config(), START, 255);
        let mut oracle = MockOracle::default();

        let err = raffle
            .request_draw(START + INTERVAL as i64, &mut oracle)
            .unwrap_err();
        assert_eq!(err, code(RaffleError::NoPlayers));
        assert_eq!(raffle.raffle_state(), RaffleState::Open);
    }

    #[test]
    fn draw_request_closes_the_raffle_once() {
        let (mut raffle, _) = raffle_with_players(2);
        let mut oracle = MockOracle::default();
        let now = START + INTERVAL as i64;

        let request_id = raffle.request_draw(now, &mut oracle).unwrap();
        assert_eq!(raffle.raffle_state(), RaffleState::Calculating);
        assert_eq!(raffle.pending_request(), Some(request_id));

        let err = raffle.request_draw(now, &mut oracle).unwrap_err();
        assert_eq!(err, code(RaffleError::RaffleNotOpen));

        let err = raffle.enter(Pubkey::new_unique(), FEE).unwrap_err();
        assert_eq!(err, code(RaffleError::RaffleNotOpen));
        assert_eq!(raffle.number_of_players(), 2);
        assert_eq!(oracle.requests.len(), 1);
    }

    #[test]
    fn draw_request_carries_the_configured_shape() {
        let (mut raffle, _) = raffle_with_players(1);
        let mut oracle = MockOracle::default();

        raffle.request_draw(START + INTERVAL as i64, &mut oracle).unwrap();

        assert_eq!(
            oracle.requests,
            vec![RandomWordsRequest {
                key_hash: [9; 32],
                subscription_id: 77,
                request_confirmations: 3,
                callback_compute_limit: 500_000,
                num_words: 1,
                nonce: 0,
            }]
        );
    }

    #[test]
    fn oracle_failure_leaves_the_raffle_open() {
        let (mut raffle, _) = raffle_with_players(1);
        let before = raffle.clone();
        let mut oracle = MockOracle {
            fail: true,
            ..Default::default()
        };

        assert!(raffle.request_draw(START + INTERVAL as i64, &mut oracle).is_err());
        assert_eq!(raffle, before);
    }

    #[test]
    fn readiness_needs_time_state_and_funds() {
        let (mut raffle, _) = raffle_with_players(1);
        let due = START + INTERVAL as i64;

        assert!(!raffle.check_draw_ready(due - 1, FEE));
        assert!(!raffle.check_draw_ready(due, 0));
        assert!(raffle.check_draw_ready(due, FEE));

        let empty = Raffle::new(config(), START, 255);
        assert!(!empty.check_draw_ready(due, FEE));

        raffle.request_draw(due, &mut MockOracle::default()).unwrap();
        assert!(!raffle.check_draw_ready(due + 1_000, FEE));
    }

    #[test]
    fn mismatched_callback_changes_nothing() {
        let (mut raffle, _) = raffle_with_players(3);
        let mut oracle = MockOracle::default();
        let now = START + INTERVAL as i64;
        raffle.request_draw(now, &mut oracle).unwrap();
        let before = raffle.clone();
        let mut vault = MockVault {
            held: 3 * FEE,
            paid: vec![],
        };

        let err = raffle
            .fulfill(word_from_u64(999), &[word_from_u64(1)], now, &mut vault)
            .unwrap_err();
        assert_eq!(err, code(RaffleError::RequestIdMismatch));
        assert_eq!(raffle, before);
        assert!(vault.paid.is_empty());
    }

    #[test]
    fn callback_without_a_pending_draw_is_rejected() {
        let (mut raffle, _) = raffle_with_players(3);
        let before = raffle.clone();
        let mut vault = MockVault {
            held: 3 * FEE,
            paid: vec![],
        };

        let err = raffle
            .fulfill(word_from_u64(1), &[word_from_u64(1)], START + 100, &mut vault)
            .unwrap_err();
        assert_eq!(err, code(RaffleError::RequestIdMismatch));
        assert_eq!(raffle, before);
    }

    #[test]
    fn callback_without_words_is_rejected() {
        let (mut raffle, _) = raffle_with_players(2);
        let now = START + INTERVAL as i64;
        let request_id = raffle.request_draw(now, &mut MockOracle::default()).unwrap();

        let err = raffle.select_winner(request_id, &[]).unwrap_err();
        assert_eq!(err, code(RaffleError::NoRandomWords));
    }

    #[test]
    fn winner_index_is_word_mod_pool_size() {
        for value in [0u64, 1, 2, 3, 4, 5, 1_000_003, u64::MAX] {
            let (mut raffle, players) = raffle_with_players(4);
            let now = START + INTERVAL as i64;
            let request_id = raffle.request_draw(now, &mut MockOracle::default()).unwrap();

            let winner = raffle
                .select_winner(request_id, &[word_from_u64(value)])
                .unwrap();
            assert_eq!(winner, players[(value % 4) as usize]);
        }
    }

    #[test]
    fn fulfilled_draw_resets_and_pays_everything() {
        let (mut raffle, players) = raffle_with_players(3);
        let mut oracle = MockOracle::default();
        let now = START + INTERVAL as i64;
        let request_id = raffle.request_draw(now, &mut oracle).unwrap();
        let mut vault = MockVault {
            held: 3 * FEE,
            paid: vec![],
        };

        let winner = raffle
            .fulfill(request_id, &[word_from_u64(7)], now + 42, &mut vault)
            .unwrap();

        assert_eq!(winner, players[1]);
        assert_eq!(raffle.recent_winner(), Some(players[1]));
        assert_eq!(raffle.raffle_state(), RaffleState::Open);
        assert_eq!(raffle.number_of_players(), 0);
        assert_eq!(raffle.last_timestamp(), now + 42);
        assert_eq!(raffle.pending_request(), None);
        assert_eq!(vault.held, 0);
        assert_eq!(vault.paid, vec![(players[1], 3 * FEE)]);

        // The same answer cannot be replayed.
        let err = raffle
            .fulfill(request_id, &[word_from_u64(7)], now + 43, &mut vault)
            .unwrap_err();
        assert_eq!(err, code(RaffleError::RequestIdMismatch));
    }

    #[test]
    fn next_cycle_uses_a_fresh_request() {
        let (mut raffle, _) = raffle_with_players(1);
        let mut oracle = MockOracle::default();
        let first_due = START + INTERVAL as i64;
        let first = raffle.request_draw(first_due, &mut oracle).unwrap();
        let mut vault = MockVault {
            held: FEE,
            paid: vec![],
        };
        raffle
            .fulfill(first, &[word_from_u64(0)], first_due, &mut vault)
            .unwrap();

        raffle.enter(Pubkey::new_unique(), FEE).unwrap();
        let err = raffle
            .request_draw(first_due + INTERVAL as i64 - 1, &mut oracle)
            .unwrap_err();
        assert_eq!(err, code(RaffleError::NotEnoughTimePassed));

        let second = raffle
            .request_draw(first_due + INTERVAL as i64, &mut oracle)
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(oracle.requests[1].nonce, 1);
    }
}
