use anchor_lang::prelude::*;

use crate::{
    constants::{RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    state::{Raffle, Treasury},
};

/// Event emitted when a player enters
#[event]
pub struct EnteredRaffle {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The player's address
    pub player: Pubkey,
}

/// Enters the signer into the current draw.
///
/// # Arguments
/// * `amount` - Lamports paid; must be at least the entrance fee and is kept whole
///
/// # Errors
/// - `NotEnoughPayment` if `amount` is below the entrance fee
/// - `RaffleNotOpen` while a draw is waiting on the oracle
/// - `RaffleFull` once every entry slot is taken
///
/// # Implementation Notes
/// - The pool is updated before the lamports move
/// - The treasury balance is checked after the transfer
pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
    ctx.accounts
        .raffle
        .enter(ctx.accounts.player.key(), amount)?;

    let pre_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();

    anchor_lang::solana_program::program::invoke(
        &anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.player.key(),
            &ctx.accounts.treasury.key(),
            amount,
        ),
        &[
            ctx.accounts.player.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
            ctx.accounts.treasury.to_account_info(),
        ],
    )?;

    let post_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();
    require!(
        post_transfer_balance
            == pre_transfer_balance
                .checked_add(amount)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::TransferFailed
    );

    emit!(EnteredRaffle {
        raffle: ctx.accounts.raffle.key(),
        player: ctx.accounts.player.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EnterRaffle<'info> {
    #[account(
        mut,
        seeds = [RAFFLE_SEED],
        bump = raffle.bump(),
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        mut,
        seeds = [
            TREASURY_SEED,
            raffle.key().as_ref(),
        ],
        bump = treasury.bump,
        constraint = treasury.key() == raffle.treasury() @ RaffleError::InvalidTreasury,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}
