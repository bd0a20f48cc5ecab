use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, FromPrimitive, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Betting is closed for this market")]
    BettingClosed = 0,

    #[error("Owner already has a stake on this market")]
    DuplicateStake = 1,

    #[error("Unauthorized")]
    Unauthorized = 2,

    #[error("Stake has already been settled")]
    AlreadySettled = 3,

    #[error("Outcome has not been announced")]
    OutcomeNotAnnounced = 4,

    #[error("Combined fee rate exceeds 100%")]
    InvalidFeeConfiguration = 5,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow = 6,

    #[error("Escrow vault cannot cover the transfer")]
    InsufficientVaultFunds = 7,

    #[error("Zero amount not allowed")]
    ZeroAmount = 8,

    #[error("Betting already closed")]
    BettingAlreadyClosed = 9,

    #[error("Betting must be closed before the outcome is announced")]
    BettingStillOpen = 10,

    #[error("Outcome already announced")]
    OutcomeAlreadyAnnounced = 11,

    #[error("Invalid outcome name length")]
    InvalidStringLength = 12,

    #[error("Market already exists")]
    MarketAlreadyExists = 13,

    #[error("Invalid PDA")]
    InvalidPDA = 14,

    #[error("Stake does not belong to this market")]
    StakeMarketMismatch = 15,

    #[error("Fee recipient does not match the market")]
    InvalidFeeRecipient = 16,

    #[error("Invalid mint")]
    InvalidMint = 17,

    #[error("Invalid token account")]
    InvalidTokenAccount = 18,
}

impl PrintProgramError for EscrowError {
    fn print<E>(&self) {
        use solana_program::msg;
        msg!("EscrowError: {}", self);
    }
}

impl From<EscrowError> for ProgramError {
    fn from(e: EscrowError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for EscrowError {
    fn type_of() -> &'static str {
        "EscrowError"
    }
}
