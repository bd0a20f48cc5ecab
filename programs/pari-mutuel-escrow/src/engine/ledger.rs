use solana_program::{entrypoint::ProgramResult, program_error::ProgramError};

/// Who receives funds leaving the escrow vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// The stake owner
    Owner,
    /// The market's platform fee recipient
    PlatformFee,
    /// The market's developer fee recipient
    DeveloperFee,
}

/// Fund movement capability for a market's escrow vault.
///
/// `credit` is only used while placing a stake and `debit` only while
/// settling one. Implementations move funds synchronously; the caller commits
/// state changes only after the movement succeeded.
pub trait Ledger {
    /// Move `amount` from the participant into the vault.
    fn credit(&mut self, amount: u64) -> ProgramResult;

    /// Pay `amount` out of the vault to `recipient`.
    fn debit(&mut self, recipient: Recipient, amount: u64) -> ProgramResult;

    /// Funds currently held in escrow, excluding any reserve the host keeps.
    fn vault_balance(&self) -> Result<u64, ProgramError>;
}
