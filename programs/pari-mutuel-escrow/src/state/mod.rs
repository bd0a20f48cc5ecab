pub mod market;
pub mod stake;

pub use market::*;
pub use stake::*;

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    program_error::ProgramError,
    pubkey::Pubkey,
};

/// Accounts are allocated at their maximum size, so trailing bytes are expected.
pub(crate) fn load_account<T: BorshDeserialize>(
    account: &AccountInfo,
    program_id: &Pubkey,
) -> Result<T, ProgramError> {
    if account.owner != program_id {
        return Err(ProgramError::IncorrectProgramId);
    }
    let data = account.try_borrow_data()?;
    let mut cursor: &[u8] = &data;
    T::deserialize(&mut cursor).map_err(|_| ProgramError::InvalidAccountData)
}

pub(crate) fn store_account<T: BorshSerialize>(
    value: &T,
    account: &AccountInfo,
) -> Result<(), ProgramError> {
    let mut data = account.try_borrow_mut_data()?;
    value
        .serialize(&mut &mut data[..])
        .map_err(|_| ProgramError::AccountDataTooSmall)
}
