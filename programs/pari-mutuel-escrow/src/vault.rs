//! Escrow vaults backing the `Ledger` capability on-chain.
//!
//! Native markets keep lamports on the market PDA itself, above its
//! rent-exempt reserve. Token markets keep an SPL token account at the vault
//! PDA whose token authority is the market PDA.

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    sysvar::Sysvar,
};

use crate::{
    cpi::{transfer_lamports, transfer_tokens, unpack_token_account},
    engine::{Ledger, Recipient},
    error::EscrowError,
    pda::{as_signer_seeds, with_bump, MarketPDA},
    state::Market,
};

/// Accounts on the other side of a vault transfer
pub struct Counterparties<'a, 'b> {
    /// Stake owner, signer of the instruction
    pub owner: &'b AccountInfo<'a>,
    /// Where the owner's funds come from and go to: the wallet itself for
    /// native markets, a token account for SPL markets
    pub owner_funds: &'b AccountInfo<'a>,
    pub platform_fee: Option<&'b AccountInfo<'a>>,
    pub developer_fee: Option<&'b AccountInfo<'a>>,
}

impl<'a, 'b> Counterparties<'a, 'b> {
    pub fn depositor(owner: &'b AccountInfo<'a>, owner_funds: &'b AccountInfo<'a>) -> Self {
        Self {
            owner,
            owner_funds,
            platform_fee: None,
            developer_fee: None,
        }
    }

    fn account_for(&self, recipient: Recipient) -> Result<&'b AccountInfo<'a>, ProgramError> {
        match recipient {
            Recipient::Owner => Ok(self.owner_funds),
            Recipient::PlatformFee => self
                .platform_fee
                .ok_or_else(|| EscrowError::InvalidFeeRecipient.into()),
            Recipient::DeveloperFee => self
                .developer_fee
                .ok_or_else(|| EscrowError::InvalidFeeRecipient.into()),
        }
    }
}

/// Lamports held by the market PDA
pub struct NativeVault<'a, 'b> {
    market: &'b AccountInfo<'a>,
    parties: Counterparties<'a, 'b>,
    system_program: Option<&'b AccountInfo<'a>>,
    rent_reserve: u64,
}

impl<'a, 'b> NativeVault<'a, 'b> {
    pub fn new(
        market: &'b AccountInfo<'a>,
        parties: Counterparties<'a, 'b>,
        system_program: Option<&'b AccountInfo<'a>>,
    ) -> Result<Self, ProgramError> {
        let rent_reserve = Rent::get()?.minimum_balance(market.data_len());
        Ok(Self {
            market,
            parties,
            system_program,
            rent_reserve,
        })
    }
}

impl<'a, 'b> Ledger for NativeVault<'a, 'b> {
    fn credit(&mut self, amount: u64) -> ProgramResult {
        let system_program = self.system_program.ok_or(ProgramError::NotEnoughAccountKeys)?;
        transfer_lamports(self.parties.owner_funds, self.market, amount, system_program)
    }

    fn debit(&mut self, recipient: Recipient, amount: u64) -> ProgramResult {
        let destination = self.parties.account_for(recipient)?;
        if destination.key == self.market.key {
            return Err(EscrowError::InvalidFeeRecipient.into());
        }
        if self.vault_balance()? < amount {
            return Err(EscrowError::InsufficientVaultFunds.into());
        }

        let vault_lamports = self
            .market
            .lamports()
            .checked_sub(amount)
            .ok_or(EscrowError::InsufficientVaultFunds)?;
        let destination_lamports = destination
            .lamports()
            .checked_add(amount)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        **self.market.try_borrow_mut_lamports()? = vault_lamports;
        **destination.try_borrow_mut_lamports()? = destination_lamports;

        msg!("Paid {} lamports to {}", amount, destination.key);
        Ok(())
    }

    fn vault_balance(&self) -> Result<u64, ProgramError> {
        Ok(self.market.lamports().saturating_sub(self.rent_reserve))
    }
}

/// SPL tokens held by the vault PDA token account
pub struct TokenVault<'a, 'b> {
    vault: &'b AccountInfo<'a>,
    market: &'b AccountInfo<'a>,
    mint: Pubkey,
    market_seeds: Vec<Vec<u8>>,
    parties: Counterparties<'a, 'b>,
    token_program: &'b AccountInfo<'a>,
}

impl<'a, 'b> TokenVault<'a, 'b> {
    pub fn new(
        market_state: &Market,
        mint: Pubkey,
        market: &'b AccountInfo<'a>,
        vault: &'b AccountInfo<'a>,
        parties: Counterparties<'a, 'b>,
        token_program: &'b AccountInfo<'a>,
    ) -> Result<Self, ProgramError> {
        if token_program.key != &spl_token::ID {
            return Err(ProgramError::IncorrectProgramId);
        }
        Ok(Self {
            vault,
            market,
            mint,
            market_seeds: with_bump(MarketPDA::seeds(market_state.market_id), market_state.bump),
            parties,
            token_program,
        })
    }
}

impl<'a, 'b> Ledger for TokenVault<'a, 'b> {
    fn credit(&mut self, amount: u64) -> ProgramResult {
        unpack_token_account(self.parties.owner_funds, &self.mint)?;
        transfer_tokens(
            self.parties.owner_funds,
            self.vault,
            self.parties.owner,
            amount,
            self.token_program,
            &[],
        )
    }

    fn debit(&mut self, recipient: Recipient, amount: u64) -> ProgramResult {
        let destination = self.parties.account_for(recipient)?;
        unpack_token_account(destination, &self.mint)?;
        if self.vault_balance()? < amount {
            return Err(EscrowError::InsufficientVaultFunds.into());
        }

        let seeds = as_signer_seeds(&self.market_seeds);
        transfer_tokens(
            self.vault,
            destination,
            self.market,
            amount,
            self.token_program,
            &[&seeds],
        )?;

        msg!("Paid {} tokens to {}", amount, destination.key);
        Ok(())
    }

    fn vault_balance(&self) -> Result<u64, ProgramError> {
        Ok(unpack_token_account(self.vault, &self.mint)?.amount)
    }
}

/// Vault selected by the market's asset
pub enum EscrowVault<'a, 'b> {
    Native(NativeVault<'a, 'b>),
    Token(TokenVault<'a, 'b>),
}

impl<'a, 'b> Ledger for EscrowVault<'a, 'b> {
    fn credit(&mut self, amount: u64) -> ProgramResult {
        match self {
            EscrowVault::Native(vault) => vault.credit(amount),
            EscrowVault::Token(vault) => vault.credit(amount),
        }
    }

    fn debit(&mut self, recipient: Recipient, amount: u64) -> ProgramResult {
        match self {
            EscrowVault::Native(vault) => vault.debit(recipient, amount),
            EscrowVault::Token(vault) => vault.debit(recipient, amount),
        }
    }

    fn vault_balance(&self) -> Result<u64, ProgramError> {
        match self {
            EscrowVault::Native(vault) => vault.vault_balance(),
            EscrowVault::Token(vault) => vault.vault_balance(),
        }
    }
}
