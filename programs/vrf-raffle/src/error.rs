use anchor_lang::error_code;

#[error_code]
pub enum RaffleError {
    #[msg("Payment is below the entrance fee")]
    NotEnoughPayment,
    #[msg("Raffle is not open")]
    RaffleNotOpen,
    #[msg("Draw interval has not elapsed")]
    NotEnoughTimePassed,
    #[msg("Raffle has no players")]
    NoPlayers,
    #[msg("Raffle is full")]
    RaffleFull,
    #[msg("Callback was not signed by the configured oracle")]
    UnauthorizedCallback,
    #[msg("Request id does not match the pending draw")]
    RequestIdMismatch,
    #[msg("Oracle delivered no random words")]
    NoRandomWords,
    #[msg("Winner account does not match the selected winner")]
    WinnerAccountMismatch,
    #[msg("Prize transfer failed")]
    TransferFailed,
    #[msg("Treasury does not belong to this raffle")]
    InvalidTreasury,
    #[msg("Oracle key must be set")]
    InvalidOracle,
    Overflow,
}
