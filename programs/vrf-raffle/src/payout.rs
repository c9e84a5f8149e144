use anchor_lang::prelude::*;

use crate::{error::RaffleError, state::Raffle};

/// Holder of the pooled entrance fees.
pub trait PrizeVault {
    /// Lamports available for the prize.
    fn held(&self) -> u64;

    /// Moves `amount` to `to`. This is the only step of a draw that reaches
    /// outside the raffle, so it always runs last.
    fn release(&mut self, to: &Pubkey, amount: u64) -> Result<()>;
}

/// Interaction half of a draw. By the time one exists the raffle has already
/// been reset; executing it pays the winner, and a failed payment puts the
/// raffle back exactly as it was before the draw was settled.
#[must_use = "the winner is not paid until the payout is executed"]
pub struct PendingPayout {
    winner: Pubkey,
    prize: u64,
    snapshot: Raffle,
}

impl PendingPayout {
    pub(crate) fn new(winner: Pubkey, prize: u64, snapshot: Raffle) -> Self {
        Self {
            winner,
            prize,
            snapshot,
        }
    }

    pub fn winner(&self) -> Pubkey {
        self.winner
    }

    pub fn prize(&self) -> u64 {
        self.prize
    }

    pub fn execute<V: PrizeVault>(self, raffle: &mut Raffle, vault: &mut V) -> Result<Pubkey> {
        if let Err(cause) = vault.release(&self.winner, self.prize) {
            msg!("Prize transfer to {} failed: {}", self.winner, cause);
            *raffle = self.snapshot;
            return err!(RaffleError::TransferFailed);
        }

        Ok(self.winner)
    }
}

/// Lamports the treasury must keep to stay rent exempt.
pub fn treasury_reserve(treasury: &AccountInfo) -> Result<u64> {
    Ok(Rent::get()?.minimum_balance(treasury.data_len()))
}

/// Lamports in the treasury above its rent-exempt reserve.
pub fn prize_pool(treasury: &AccountInfo) -> Result<u64> {
    Ok(treasury.lamports().saturating_sub(treasury_reserve(treasury)?))
}

/// Treasury PDA backed vault. The treasury is owned by this program, so
/// lamports move by direct debit and credit; the rent-exempt reserve of the
/// treasury itself is never paid out.
pub struct TreasuryVault<'info> {
    treasury: AccountInfo<'info>,
    winner: AccountInfo<'info>,
    reserve: u64,
}

impl<'info> TreasuryVault<'info> {
    pub fn new(treasury: AccountInfo<'info>, winner: AccountInfo<'info>, reserve: u64) -> Self {
        Self {
            treasury,
            winner,
            reserve,
        }
    }
}

impl PrizeVault for TreasuryVault<'_> {
    fn held(&self) -> u64 {
        self.treasury.lamports().saturating_sub(self.reserve)
    }

    fn release(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        require_keys_eq!(*to, *self.winner.key, RaffleError::WinnerAccountMismatch);
        require!(amount <= self.held(), RaffleError::TransferFailed);

        // Program accounts and read-only accounts cannot take the prize.
        require!(
            self.winner.is_writable && !self.winner.executable,
            RaffleError::TransferFailed
        );

        let balance = self
            .winner
            .lamports()
            .checked_add(amount)
            .ok_or(RaffleError::Overflow)?;
        require!(
            Rent::get()?.is_exempt(balance, self.winner.data_len()),
            RaffleError::TransferFailed
        );

        self.treasury.sub_lamports(amount)?;
        self.winner.add_lamports(amount)?;

        Ok(())
    }
}
