use anchor_lang::prelude::*;

// 8 discriminator, 32 raffle, 1 bump
pub const TREASURY_ACCOUNT_SIZE: usize = 8 + 32 + 1;

/// Program-owned PDA holding the pooled entrance fees. Everything above its
/// rent-exempt minimum belongs to the next winner.
#[account]
pub struct Treasury {
    pub raffle: Pubkey,
    pub bump: u8,
}
