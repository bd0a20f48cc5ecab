//! System program and SPL Token CPI helpers

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    system_program,
    sysvar::Sysvar,
};
use spl_token::{instruction as token_instruction, state::Account as TokenAccount};

use crate::error::EscrowError;

/// Create a rent-exempt PDA account owned by `owner`.
///
/// An address can be pre-funded by anyone, which makes `create_account`
/// fail. In that case the missing rent is topped up and the account is
/// allocated and assigned in place.
pub fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    new_account: &AccountInfo<'a>,
    space: usize,
    owner: &Pubkey,
    system_program: &AccountInfo<'a>,
    signer_seeds: &[&[u8]],
) -> ProgramResult {
    if system_program.key != &system_program::ID {
        return Err(ProgramError::IncorrectProgramId);
    }

    let rent = Rent::get()?;
    let required_lamports = rent.minimum_balance(space);

    if new_account.lamports() == 0 {
        return invoke_signed(
            &system_instruction::create_account(
                payer.key,
                new_account.key,
                required_lamports,
                space as u64,
                owner,
            ),
            &[payer.clone(), new_account.clone(), system_program.clone()],
            &[signer_seeds],
        );
    }

    let top_up = required_lamports.saturating_sub(new_account.lamports());
    if top_up > 0 {
        transfer_lamports(payer, new_account, top_up, system_program)?;
    }
    invoke_signed(
        &system_instruction::allocate(new_account.key, space as u64),
        &[new_account.clone(), system_program.clone()],
        &[signer_seeds],
    )?;
    invoke_signed(
        &system_instruction::assign(new_account.key, owner),
        &[new_account.clone(), system_program.clone()],
        &[signer_seeds],
    )
}

/// Transfer lamports from a system-owned signer
pub fn transfer_lamports<'a>(
    from: &AccountInfo<'a>,
    to: &AccountInfo<'a>,
    lamports: u64,
    system_program: &AccountInfo<'a>,
) -> ProgramResult {
    invoke(
        &system_instruction::transfer(from.key, to.key, lamports),
        &[from.clone(), to.clone(), system_program.clone()],
    )
}

/// Create the market's token vault at its PDA, with the market as token authority
pub fn create_token_vault<'a>(
    payer: &AccountInfo<'a>,
    vault: &AccountInfo<'a>,
    mint: &AccountInfo<'a>,
    vault_authority: &Pubkey,
    token_program: &AccountInfo<'a>,
    system_program: &AccountInfo<'a>,
    vault_seeds: &[&[u8]],
) -> ProgramResult {
    create_pda_account(
        payer,
        vault,
        TokenAccount::LEN,
        &spl_token::ID,
        system_program,
        vault_seeds,
    )?;

    invoke(
        &token_instruction::initialize_account3(
            &spl_token::ID,
            vault.key,
            mint.key,
            vault_authority,
        )?,
        &[vault.clone(), mint.clone(), token_program.clone()],
    )
}

/// Transfer SPL tokens. Empty `signer_seeds` means the authority signed the transaction.
pub fn transfer_tokens<'a>(
    source: &AccountInfo<'a>,
    destination: &AccountInfo<'a>,
    authority: &AccountInfo<'a>,
    amount: u64,
    token_program: &AccountInfo<'a>,
    signer_seeds: &[&[&[u8]]],
) -> ProgramResult {
    let instruction = token_instruction::transfer(
        &spl_token::ID,
        source.key,
        destination.key,
        authority.key,
        &[],
        amount,
    )?;
    let account_infos = [
        source.clone(),
        destination.clone(),
        authority.clone(),
        token_program.clone(),
    ];

    if signer_seeds.is_empty() {
        invoke(&instruction, &account_infos)
    } else {
        invoke_signed(&instruction, &account_infos, signer_seeds)
    }
}

/// Unpack an SPL token account, checking it is held by the token program and of `mint`.
pub fn unpack_token_account(
    account: &AccountInfo,
    mint: &Pubkey,
) -> Result<TokenAccount, ProgramError> {
    if account.owner != &spl_token::ID {
        return Err(EscrowError::InvalidTokenAccount.into());
    }
    let token_account = TokenAccount::unpack(&account.try_borrow_data()?)
        .map_err(|_| EscrowError::InvalidTokenAccount)?;
    if token_account.mint != *mint {
        return Err(EscrowError::InvalidMint.into());
    }
    Ok(token_account)
}
