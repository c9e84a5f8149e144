use anchor_lang::prelude::*;

use crate::{
    constants::{RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    payout::prize_pool,
    state::{Raffle, Treasury},
};

/// Answer of `check_upkeep`, returned through transaction return data.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    /// Whether `perform_upkeep` would start a draw right now
    pub upkeep_needed: bool,
    /// Reserved for automation metadata; always empty
    pub perform_data: Vec<u8>,
}

/// Read-only readiness check for automation agents. Anyone may call it.
///
/// A draw is due when the interval has elapsed, the raffle is open and the
/// treasury holds entrance fees. Whether the oracle subscription is funded
/// cannot be seen from here.
pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<UpkeepStatus> {
    let now = Clock::get()?.unix_timestamp;
    let balance = prize_pool(&ctx.accounts.treasury.to_account_info())?;

    Ok(UpkeepStatus {
        upkeep_needed: ctx.accounts.raffle.check_draw_ready(now, balance),
        perform_data: Vec::new(),
    })
}

#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(
        seeds = [RAFFLE_SEED],
        bump = raffle.bump(),
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        seeds = [
            TREASURY_SEED,
            raffle.key().as_ref(),
        ],
        bump = treasury.bump,
        constraint = treasury.key() == raffle.treasury() @ RaffleError::InvalidTreasury,
    )]
    pub treasury: Account<'info, Treasury>,
}
