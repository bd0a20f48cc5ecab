use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::STAKE_DISCRIMINATOR,
    state::{load_account, store_account, Side},
};

/// A single participant's wager on a market
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct Stake {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Stake PDA bump
    pub bump: u8,

    /// Market this stake belongs to
    pub market: Pubkey,

    /// Participant who placed the stake
    pub owner: Pubkey,

    /// Backed outcome
    pub side: Side,

    /// Amount escrowed, in base units of the market asset
    pub amount: u64,

    pub settled: bool,

    /// Amount paid to the owner at settlement (0 for a losing stake)
    pub payout: u64,
}

impl Stake {
    pub const LEN: usize = 8 + 1 + 32 + 32 + 1 + 8 + 1 + 8;

    pub fn new(market: Pubkey, owner: Pubkey, side: Side, amount: u64) -> Self {
        Self {
            discriminator: STAKE_DISCRIMINATOR,
            bump: 0,
            market,
            owner,
            side,
            amount,
            settled: false,
            payout: 0,
        }
    }

    pub fn load(account: &AccountInfo, program_id: &Pubkey) -> Result<Self, ProgramError> {
        let stake: Self = load_account(account, program_id)?;
        if stake.discriminator != STAKE_DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(stake)
    }

    pub fn save(&self, account: &AccountInfo) -> Result<(), ProgramError> {
        store_account(self, account)
    }
}
