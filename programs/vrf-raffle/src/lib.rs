use anchor_lang::prelude::*;
use instructions::*;

pub mod constants;
pub mod error;
pub mod instructions;
pub mod oracle;
pub mod payout;
pub mod state;

declare_id!("9ZsUJeMvnpAAn5BM9j2CJpdQrFvWZX95T6aovsYoqe7z");

#[program]
pub mod vrf_raffle {
    use super::*;

    pub fn initialize_raffle(
        ctx: Context<InitializeRaffle>,
        entrance_fee: u64,
        interval: u64,
        key_hash: [u8; 32],
        subscription_id: u64,
        callback_compute_limit: u32,
    ) -> Result<()> {
        instructions::initialize_raffle::initialize_raffle(
            ctx,
            entrance_fee,
            interval,
            key_hash,
            subscription_id,
            callback_compute_limit,
        )
    }

    pub fn enter_raffle(ctx: Context<EnterRaffle>, amount: u64) -> Result<()> {
        instructions::enter_raffle::enter_raffle(ctx, amount)
    }

    pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<UpkeepStatus> {
        instructions::check_upkeep::check_upkeep(ctx)
    }

    pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
        instructions::perform_upkeep::perform_upkeep(ctx)
    }

    pub fn fulfill_random_words(
        ctx: Context<FulfillRandomWords>,
        request_id: [u8; 32],
        random_words: Vec<[u8; 32]>,
    ) -> Result<()> {
        instructions::fulfill_random_words::fulfill_random_words(ctx, request_id, random_words)
    }

    pub fn get_entrance_fee(ctx: Context<GetEntranceFee>) -> Result<u64> {
        instructions::get_entrance_fee::get_entrance_fee(ctx)
    }
}
