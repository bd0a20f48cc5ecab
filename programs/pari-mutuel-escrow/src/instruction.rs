//! Instruction definitions and client-side builders

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::{
    pda::{MarketPDA, StakePDA, VaultPDA},
    state::Side,
};

/// Parameters for opening a market
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct OpenMarketParams {
    pub market_id: u64,
    pub outcome_a_name: String,
    pub outcome_b_name: String,
    pub fee_bps: u16,
    pub developer_fee_bps: u16,
    pub fee_recipient: Pubkey,
    pub developer_fee_recipient: Option<Pubkey>,
    /// `None` escrows native lamports
    pub token_mint: Option<Pubkey>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub enum EscrowInstruction {
    /// Open a market with betting enabled and the outcome undecided
    /// Accounts:
    /// 0. `[signer, writable]` Authority, pays for the market account
    /// 1. `[writable]` Market PDA
    /// 2. `[]` System program
    /// 3. `[writable]` Platform fee recipient, topped up to rent exemption on native markets
    /// 4. `[writable]` Developer fee recipient (ignored when the market has none)
    /// Token markets only:
    /// 5. `[]` Mint
    /// 6. `[writable]` Token vault PDA
    /// 7. `[]` Token program
    OpenMarket { params: OpenMarketParams },

    /// Escrow a stake on one side of an open market
    /// Accounts:
    /// 0. `[signer, writable]` Owner, pays for the stake account
    /// 1. `[writable]` Market PDA
    /// 2. `[writable]` Stake PDA
    /// 3. `[]` System program
    /// Token markets only:
    /// 4. `[writable]` Owner token account
    /// 5. `[writable]` Token vault PDA
    /// 6. `[]` Token program
    PlaceStake { side: Side, amount: u64 },

    /// Stop accepting stakes
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[writable]` Market PDA
    CloseBetting,

    /// Record the winning side
    /// Accounts:
    /// 0. `[signer]` Authority
    /// 1. `[writable]` Market PDA
    AnnounceOutcome { winner: Side },

    /// Pay out a stake after the outcome is announced
    /// Accounts:
    /// 0. `[signer, writable]` Owner
    /// 1. `[writable]` Market PDA
    /// 2. `[writable]` Stake PDA
    /// 3. `[writable]` Platform fee recipient
    /// 4. `[writable]` Developer fee recipient (ignored when the market has none)
    /// Token markets only:
    /// 5. `[writable]` Owner token account
    /// 6. `[writable]` Token vault PDA
    /// 7. `[]` Token program
    SettleStake,
}

impl EscrowInstruction {
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| ProgramError::InvalidInstructionData)
    }

    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec()
            .map_err(|_| ProgramError::InvalidInstructionData)
    }
}

pub fn open_market(
    program_id: &Pubkey,
    authority: &Pubkey,
    params: OpenMarketParams,
) -> Result<Instruction, ProgramError> {
    let (market, _) = MarketPDA::derive(program_id, params.market_id);
    let mut accounts = vec![
        AccountMeta::new(*authority, true),
        AccountMeta::new(market, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new(params.fee_recipient, false),
        AccountMeta::new(
            params.developer_fee_recipient.unwrap_or(params.fee_recipient),
            false,
        ),
    ];
    if let Some(mint) = params.token_mint {
        let (vault, _) = VaultPDA::derive(program_id, &market);
        accounts.push(AccountMeta::new_readonly(mint, false));
        accounts.push(AccountMeta::new(vault, false));
        accounts.push(AccountMeta::new_readonly(spl_token::id(), false));
    }

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: EscrowInstruction::OpenMarket { params }.pack()?,
    })
}

/// `owner_token_account` is required for token markets and must be `None` for native ones.
pub fn place_stake(
    program_id: &Pubkey,
    owner: &Pubkey,
    market_id: u64,
    side: Side,
    amount: u64,
    owner_token_account: Option<&Pubkey>,
) -> Result<Instruction, ProgramError> {
    let (market, _) = MarketPDA::derive(program_id, market_id);
    let (stake, _) = StakePDA::derive(program_id, &market, owner);
    let mut accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(market, false),
        AccountMeta::new(stake, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    push_token_accounts(program_id, &market, owner_token_account, &mut accounts);

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: EscrowInstruction::PlaceStake { side, amount }.pack()?,
    })
}

pub fn close_betting(
    program_id: &Pubkey,
    authority: &Pubkey,
    market_id: u64,
) -> Result<Instruction, ProgramError> {
    authority_instruction(program_id, authority, market_id, EscrowInstruction::CloseBetting)
}

pub fn announce_outcome(
    program_id: &Pubkey,
    authority: &Pubkey,
    market_id: u64,
    winner: Side,
) -> Result<Instruction, ProgramError> {
    authority_instruction(
        program_id,
        authority,
        market_id,
        EscrowInstruction::AnnounceOutcome { winner },
    )
}

/// For token markets the fee recipients are token accounts of the market's mint.
pub fn settle_stake(
    program_id: &Pubkey,
    owner: &Pubkey,
    market_id: u64,
    fee_recipient: &Pubkey,
    developer_fee_recipient: Option<&Pubkey>,
    owner_token_account: Option<&Pubkey>,
) -> Result<Instruction, ProgramError> {
    let (market, _) = MarketPDA::derive(program_id, market_id);
    let (stake, _) = StakePDA::derive(program_id, &market, owner);
    let mut accounts = vec![
        AccountMeta::new(*owner, true),
        AccountMeta::new(market, false),
        AccountMeta::new(stake, false),
        AccountMeta::new(*fee_recipient, false),
        AccountMeta::new(*developer_fee_recipient.unwrap_or(fee_recipient), false),
    ];
    push_token_accounts(program_id, &market, owner_token_account, &mut accounts);

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: EscrowInstruction::SettleStake.pack()?,
    })
}

fn authority_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    market_id: u64,
    instruction: EscrowInstruction,
) -> Result<Instruction, ProgramError> {
    let (market, _) = MarketPDA::derive(program_id, market_id);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(market, false),
        ],
        data: instruction.pack()?,
    })
}

fn push_token_accounts(
    program_id: &Pubkey,
    market: &Pubkey,
    owner_token_account: Option<&Pubkey>,
    accounts: &mut Vec<AccountMeta>,
) {
    if let Some(owner_token_account) = owner_token_account {
        let (vault, _) = VaultPDA::derive(program_id, market);
        accounts.push(AccountMeta::new(*owner_token_account, false));
        accounts.push(AccountMeta::new(vault, false));
        accounts.push(AccountMeta::new_readonly(spl_token::id(), false));
    }
}
