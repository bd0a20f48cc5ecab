// Two-outcome pari-mutuel escrow market
// Native Solana implementation - NO ANCHOR

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    pubkey::Pubkey,
};

pub mod account_validation;
pub mod constants;
pub mod cpi;
pub mod engine;
pub mod error;
pub mod events;
pub mod instruction;
pub mod pda;
pub mod processor;
pub mod state;
pub mod vault;

pub use error::EscrowError;

use crate::processor::Processor;

solana_program::declare_id!("PariMutue1Escrow111111111111111111111111111");

#[cfg(not(feature = "no-entrypoint"))]
solana_program::entrypoint!(process);

pub fn process(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    Processor::process(program_id, accounts, instruction_data)
}
