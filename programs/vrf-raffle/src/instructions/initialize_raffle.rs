use anchor_lang::prelude::*;

use crate::{
    constants::{RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    state::{Raffle, RaffleConfig, Treasury, TREASURY_ACCOUNT_SIZE},
};

/// Event emitted when the raffle is created
#[event]
pub struct RaffleInitialized {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The only key allowed to deliver randomness
    pub oracle: Pubkey,
    /// Minimum payment per entry in lamports
    pub entrance_fee: u64,
    /// Minimum seconds between draws
    pub interval: u64,
    /// Oracle subscription billed for every request
    pub subscription_id: u64,
}

/// Creates the raffle and its treasury.
///
/// # Arguments
/// * `entrance_fee` - Minimum lamports a player pays per entry
/// * `interval` - Seconds that must pass between draws
/// * `key_hash` - Oracle randomness source, passed through on every request
/// * `subscription_id` - Oracle billing subscription, passed through on every request
/// * `callback_compute_limit` - Compute budget the oracle grants the fulfillment callback
///
/// # Implementation Notes
/// - Every parameter, including the oracle key, is fixed from here on
/// - The raffle opens immediately and the first interval starts now
/// - There is a single raffle per program, addressed by the `["raffle"]` PDA
pub fn initialize_raffle(
    ctx: Context<InitializeRaffle>,
    entrance_fee: u64,
    interval: u64,
    key_hash: [u8; 32],
    subscription_id: u64,
    callback_compute_limit: u32,
) -> Result<()> {
    require_keys_neq!(
        ctx.accounts.oracle.key(),
        Pubkey::default(),
        RaffleError::InvalidOracle
    );

    let now = Clock::get()?.unix_timestamp;

    ctx.accounts.treasury.raffle = ctx.accounts.raffle.key();
    ctx.accounts.treasury.bump = ctx.bumps.treasury;

    let config = RaffleConfig {
        authority: ctx.accounts.authority.key(),
        oracle: ctx.accounts.oracle.key(),
        treasury: ctx.accounts.treasury.key(),
        entrance_fee,
        interval,
        key_hash,
        subscription_id,
        callback_compute_limit,
    };
    ctx.accounts
        .raffle
        .set_inner(Raffle::new(config, now, ctx.bumps.raffle));

    emit!(RaffleInitialized {
        raffle: ctx.accounts.raffle.key(),
        oracle: ctx.accounts.oracle.key(),
        entrance_fee,
        interval,
        subscription_id,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeRaffle<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + Raffle::INIT_SPACE,
        seeds = [RAFFLE_SEED],
        bump
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        init,
        payer = authority,
        space = TREASURY_ACCOUNT_SIZE,
        seeds = [
            TREASURY_SEED,
            raffle.key().as_ref(),
        ],
        bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: Only the key is stored. It has to sign every fulfillment.
    pub oracle: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}
