//! Program Derived Address (PDA) derivation functions
//!
//! Markets, stakes and token vaults all live at deterministic addresses. A
//! stake address depends on `(market, owner)`, so each owner gets at most one
//! stake per market.

use solana_program::{program_error::ProgramError, pubkey::Pubkey};

use crate::{
    constants::{MARKET_SEED, STAKE_SEED, VAULT_SEED},
    error::EscrowError,
};

/// Market PDA
pub struct MarketPDA;
impl MarketPDA {
    pub fn derive(program_id: &Pubkey, market_id: u64) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[MARKET_SEED, &market_id.to_le_bytes()], program_id)
    }

    pub fn seeds(market_id: u64) -> Vec<Vec<u8>> {
        vec![MARKET_SEED.to_vec(), market_id.to_le_bytes().to_vec()]
    }
}

/// Stake PDA
pub struct StakePDA;
impl StakePDA {
    pub fn derive(program_id: &Pubkey, market: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[STAKE_SEED, market.as_ref(), owner.as_ref()], program_id)
    }

    pub fn seeds(market: &Pubkey, owner: &Pubkey) -> Vec<Vec<u8>> {
        vec![
            STAKE_SEED.to_vec(),
            market.as_ref().to_vec(),
            owner.as_ref().to_vec(),
        ]
    }
}

/// Token vault PDA (SPL markets only)
pub struct VaultPDA;
impl VaultPDA {
    pub fn derive(program_id: &Pubkey, market: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[VAULT_SEED, market.as_ref()], program_id)
    }

    pub fn seeds(market: &Pubkey) -> Vec<Vec<u8>> {
        vec![VAULT_SEED.to_vec(), market.as_ref().to_vec()]
    }

    /// Recreate the vault address from the bump recorded on the market
    pub fn address(program_id: &Pubkey, market: &Pubkey, bump: u8) -> Result<Pubkey, ProgramError> {
        let seeds = with_bump(Self::seeds(market), bump);
        Pubkey::create_program_address(&as_signer_seeds(&seeds), program_id)
            .map_err(|_| EscrowError::InvalidPDA.into())
    }
}

/// Append the bump and borrow the seeds in the shape `invoke_signed` expects.
pub fn with_bump(mut seeds: Vec<Vec<u8>>, bump: u8) -> Vec<Vec<u8>> {
    seeds.push(vec![bump]);
    seeds
}

pub fn as_signer_seeds(seeds: &[Vec<u8>]) -> Vec<&[u8]> {
    seeds.iter().map(|s| s.as_slice()).collect()
}
