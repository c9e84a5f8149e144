use anchor_lang::prelude::*;

use crate::{constants::RAFFLE_SEED, state::Raffle};

/// Returns the entrance fee in lamports through return data.
pub fn get_entrance_fee(ctx: Context<GetEntranceFee>) -> Result<u64> {
    Ok(ctx.accounts.raffle.entrance_fee())
}

#[derive(Accounts)]
pub struct GetEntranceFee<'info> {
    #[account(
        seeds = [RAFFLE_SEED],
        bump = raffle.bump(),
    )]
    pub raffle: Account<'info, Raffle>,
}
