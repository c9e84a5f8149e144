use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hashv;
use arrayref::array_refs;

/// A single 32-byte word delivered by the oracle, read as a big-endian
/// unsigned 256-bit integer.
pub type RandomWord = [u8; 32];

/// Opaque handle the oracle hands back for every request.
pub type RequestId = [u8; 32];

/// Parameters of one randomness request. Everything except `nonce` is fixed
/// when the raffle is initialized and passed through unchanged.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RandomWordsRequest {
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_compute_limit: u32,
    pub num_words: u32,
    pub nonce: u64,
}

/// Emitted for every outgoing request. The off-chain oracle service watches
/// program logs for this event and answers through `fulfill_random_words`.
#[event]
pub struct RandomWordsRequested {
    pub request_id: RequestId,
    pub consumer: Pubkey,
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_compute_limit: u32,
    pub num_words: u32,
    pub nonce: u64,
    pub slot: u64,
}

/// Submission side of the oracle handshake. The delivery side is the
/// `fulfill_random_words` instruction, which only the oracle may sign.
pub trait RandomnessOracle {
    fn request_random_words(&mut self, request: &RandomWordsRequest) -> Result<RequestId>;
}

/// Request id as the oracle service derives it: a hash over the consumer
/// and every request parameter that makes the request unique.
pub fn derive_request_id(consumer: &Pubkey, request: &RandomWordsRequest) -> RequestId {
    hashv(&[
        b"request",
        consumer.as_ref(),
        &request.key_hash,
        &request.subscription_id.to_le_bytes(),
        &request.nonce.to_le_bytes(),
    ])
    .to_bytes()
}

/// On-chain oracle client. Publishes the request as an event and returns the
/// derived handle; no CPI is made, the oracle picks the request up from logs.
pub struct Coordinator {
    consumer: Pubkey,
    slot: u64,
}

impl Coordinator {
    pub fn new(consumer: Pubkey, slot: u64) -> Self {
        Self { consumer, slot }
    }
}

impl RandomnessOracle for Coordinator {
    fn request_random_words(&mut self, request: &RandomWordsRequest) -> Result<RequestId> {
        let request_id = derive_request_id(&self.consumer, request);

        emit!(RandomWordsRequested {
            request_id,
            consumer: self.consumer,
            key_hash: request.key_hash,
            subscription_id: request.subscription_id,
            request_confirmations: request.request_confirmations,
            callback_compute_limit: request.callback_compute_limit,
            num_words: request.num_words,
            nonce: request.nonce,
            slot: self.slot,
        });

        Ok(request_id)
    }
}

/// Exact `word mod modulus` over the full 256-bit word, folded one 64-bit
/// limb at a time. Returns `None` for a zero modulus.
pub fn reduce_word(word: &RandomWord, modulus: u64) -> Option<u64> {
    if modulus == 0 {
        return None;
    }

    let m = modulus as u128;
    let (a, b, c, d) = array_refs![word, 8, 8, 8, 8];
    let rem = [a, b, c, d].iter().fold(0u128, |acc, limb| {
        ((acc << 64) | u64::from_be_bytes(**limb) as u128) % m
    });

    Some(rem as u64)
}

/// Word whose integer value is `value`. Clients and oracle simulators use it
/// to build `fulfill_random_words` arguments with a known outcome.
pub fn word_from_u64(value: u64) -> RandomWord {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}
