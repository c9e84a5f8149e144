use anchor_lang::prelude::*;

use crate::{
    constants::{RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    oracle::{RandomWord, RequestId},
    payout::{treasury_reserve, PrizeVault, TreasuryVault},
    state::{Raffle, Treasury},
};

/// Event emitted when a winner is picked
#[event]
pub struct PickedWinner {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The winner's address
    pub winner: Pubkey,
    /// Lamports paid to the winner
    pub prize: u64,
}

/// Oracle callback that resolves the pending draw.
///
/// # Arguments
/// * `request_id` - Handle returned when the draw was requested
/// * `random_words` - Delivered randomness; only the first word is used
///
/// # Security Considerations
/// 1. Only the oracle key fixed at initialization may sign
/// 2. The request id must match the pending draw, so stale or replayed answers fail
/// 3. The winner account must be the entrant selected by `random_words[0] mod players`
/// 4. The raffle is reset before any lamports move
/// 5. If the winner cannot take the prize the whole instruction fails and the
///    draw stays pending
pub fn fulfill_random_words(
    ctx: Context<FulfillRandomWords>,
    request_id: RequestId,
    random_words: Vec<RandomWord>,
) -> Result<()> {
    let winner = ctx
        .accounts
        .raffle
        .select_winner(request_id, &random_words)?;
    require_keys_eq!(
        ctx.accounts.winner.key(),
        winner,
        RaffleError::WinnerAccountMismatch
    );

    let now = Clock::get()?.unix_timestamp;
    let treasury = ctx.accounts.treasury.to_account_info();
    let reserve = treasury_reserve(&treasury)?;
    let mut vault = TreasuryVault::new(treasury, ctx.accounts.winner.to_account_info(), reserve);

    let raffle_key = ctx.accounts.raffle.key();
    let raffle: &mut Raffle = &mut ctx.accounts.raffle;
    let payout = raffle.settle_draw(request_id, &random_words, now, vault.held())?;

    emit!(PickedWinner {
        raffle: raffle_key,
        winner: payout.winner(),
        prize: payout.prize(),
    });

    payout.execute(raffle, &mut vault)?;

    Ok(())
}

#[derive(Accounts)]
pub struct FulfillRandomWords<'info> {
    #[account(
        mut,
        seeds = [RAFFLE_SEED],
        bump = raffle.bump(),
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(address = raffle.oracle() @ RaffleError::UnauthorizedCallback)]
    pub oracle: Signer<'info>,

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

    /// CHECK: Must be the selected entrant; compared against the draw in the handler.
    #[account(mut)]
    pub winner: UncheckedAccount<'info>,
}
