//! Account checks shared by the instruction handlers

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::EscrowError;

/// Validate that an account is a signer
pub fn validate_signer(account: &AccountInfo) -> ProgramResult {
    if !account.is_signer {
        msg!("Account {} must be a signer", account.key);
        return Err(ProgramError::MissingRequiredSignature);
    }
    Ok(())
}

/// Validate that an account is writable
pub fn validate_writable(account: &AccountInfo) -> ProgramResult {
    if !account.is_writable {
        msg!("Account {} must be writable", account.key);
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

/// Validate that an account sits at the expected program address
pub fn validate_pda(account: &AccountInfo, expected: &Pubkey) -> ProgramResult {
    if account.key != expected {
        msg!("PDA mismatch. Expected: {}, Actual: {}", expected, account.key);
        return Err(EscrowError::InvalidPDA.into());
    }
    Ok(())
}

/// Validate that an account has never been initialized
pub fn validate_uninitialized(account: &AccountInfo, err: EscrowError) -> ProgramResult {
    if !account.data_is_empty() || account.owner != &system_program::ID {
        msg!("Account {} is already initialized", account.key);
        return Err(err.into());
    }
    Ok(())
}

/// Validate a recipient account against the key recorded on the market
pub fn validate_recipient(account: &AccountInfo, expected: &Pubkey) -> ProgramResult {
    if account.key != expected {
        msg!("Recipient mismatch. Expected: {}, Actual: {}", expected, account.key);
        return Err(EscrowError::InvalidFeeRecipient.into());
    }
    Ok(())
}
