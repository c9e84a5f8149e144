use anchor_lang::prelude::*;

use crate::{
    constants::{RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    oracle::{Coordinator, RequestId},
    payout::prize_pool,
    state::{Raffle, Treasury},
};

/// Event emitted when a draw is started
#[event]
pub struct RequestedRaffleWinner {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// Handle the oracle will answer with
    pub request_id: RequestId,
}

/// Starts a draw: closes the raffle to new entries and requests randomness.
/// Anyone may call this; the guards decide whether it goes through.
///
/// # Errors
/// - `NotEnoughTimePassed` if the interval since the last draw has not elapsed
/// - `RaffleNotOpen` if a draw is already waiting on the oracle
/// - `NoPlayers` if nobody has entered
///
/// # Implementation Notes
/// - No lamports move here; the winner is paid in `fulfill_random_words`
/// - The request is published as a `RandomWordsRequested` event
pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
    let clock = Clock::get()?;
    let raffle_key = ctx.accounts.raffle.key();
    let mut coordinator = Coordinator::new(raffle_key, clock.slot);

    let raffle = &mut ctx.accounts.raffle;
    let request_id = match raffle.request_draw(clock.unix_timestamp, &mut coordinator) {
        Ok(request_id) => request_id,
        Err(err) => {
            // Logged only; a failed read must not mask the refusal.
            let balance =
                prize_pool(&ctx.accounts.treasury.to_account_info()).unwrap_or_default();
            msg!(
                "Upkeep not needed: balance {}, players {}, state {:?}",
                balance,
                raffle.number_of_players(),
                raffle.raffle_state()
            );
            return Err(err);
        }
    };

    emit!(RequestedRaffleWinner {
        raffle: raffle_key,
        request_id,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    #[account(
        mut,
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

    pub caller: Signer<'info>,
}
