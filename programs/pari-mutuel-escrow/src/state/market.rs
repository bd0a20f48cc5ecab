use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::{MARKET_DISCRIMINATOR, MAX_OUTCOME_NAME_LEN},
    state::{load_account, store_account},
};

/// One of the two outcomes a participant can back
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Market resolution. Moves from `Undecided` to a decided side exactly once.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Undecided,
    OutcomeA,
    OutcomeB,
}

impl Outcome {
    pub fn winner(self) -> Option<Side> {
        match self {
            Outcome::Undecided => None,
            Outcome::OutcomeA => Some(Side::A),
            Outcome::OutcomeB => Some(Side::B),
        }
    }
}

impl From<Side> for Outcome {
    fn from(side: Side) -> Self {
        match side {
            Side::A => Outcome::OutcomeA,
            Side::B => Outcome::OutcomeB,
        }
    }
}

/// Asset held in escrow. Fixed at creation and selects the vault type.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    /// Lamports held directly by the market PDA
    Native,
    /// SPL tokens held by a token account owned by the market PDA
    Token { mint: Pubkey },
}

impl Asset {
    pub fn name(&self) -> &'static str {
        match self {
            Asset::Native => "native",
            Asset::Token { .. } => "token",
        }
    }

    pub fn mint(&self) -> Option<Pubkey> {
        match self {
            Asset::Native => None,
            Asset::Token { mint } => Some(*mint),
        }
    }
}

/// Two-outcome betting market
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct Market {
    /// Account discriminator
    pub discriminator: [u8; 8],

    /// Market PDA bump
    pub bump: u8,

    /// Token vault PDA bump (unused for native markets)
    pub vault_bump: u8,

    /// Market identifier, seeds the market address
    pub market_id: u64,

    /// Only key allowed to close betting and announce the outcome
    pub authority: Pubkey,

    /// Display name of outcome A (e.g. "Fighter A")
    pub outcome_a_name: String,

    /// Display name of outcome B
    pub outcome_b_name: String,

    /// Platform fee rate in basis points (300 = 3%)
    pub fee_bps: u16,

    /// Developer fee rate in basis points
    pub developer_fee_bps: u16,

    /// Platform fee destination (wallet for native, token account for SPL)
    pub fee_recipient: Pubkey,

    /// Developer fee destination
    pub developer_fee_recipient: Option<Pubkey>,

    /// Escrowed asset
    pub asset: Asset,

    /// Starts true, flipped once by the authority
    pub betting_open: bool,

    pub outcome: Outcome,

    /// Total staked on outcome A
    pub pool_a: u128,

    /// Total staked on outcome B
    pub pool_b: u128,

    /// Number of stakes on outcome A
    pub count_a: u32,

    /// Number of stakes on outcome B
    pub count_b: u32,
}

impl Market {
    pub const LEN: usize = 8 + // discriminator
        1 + // bump
        1 + // vault_bump
        8 + // market_id
        32 + // authority
        (4 + MAX_OUTCOME_NAME_LEN) + // outcome_a_name
        (4 + MAX_OUTCOME_NAME_LEN) + // outcome_b_name
        2 + // fee_bps
        2 + // developer_fee_bps
        32 + // fee_recipient
        (1 + 32) + // developer_fee_recipient
        (1 + 32) + // asset
        1 + // betting_open
        1 + // outcome
        16 + // pool_a
        16 + // pool_b
        4 + // count_a
        4; // count_b

    pub fn pool(&self, side: Side) -> u128 {
        match side {
            Side::A => self.pool_a,
            Side::B => self.pool_b,
        }
    }

    pub fn count(&self, side: Side) -> u32 {
        match side {
            Side::A => self.count_a,
            Side::B => self.count_b,
        }
    }

    pub fn outcome_name(&self, side: Side) -> &str {
        match side {
            Side::A => &self.outcome_a_name,
            Side::B => &self.outcome_b_name,
        }
    }

    pub fn load(account: &AccountInfo, program_id: &Pubkey) -> Result<Self, ProgramError> {
        let market: Self = load_account(account, program_id)?;
        if market.discriminator != MARKET_DISCRIMINATOR {
            return Err(ProgramError::InvalidAccountData);
        }
        Ok(market)
    }

    pub fn save(&self, account: &AccountInfo) -> Result<(), ProgramError> {
        store_account(self, account)
    }
}
