use solana_program::{
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::BPS_DENOMINATOR,
    engine::{Ledger, Recipient},
    error::EscrowError,
    state::{Market, Stake},
};

/// Amounts moved out of escrow when a stake is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettlementQuote {
    pub won: bool,
    pub platform_fee: u64,
    pub developer_fee: u64,
    /// Stake minus fees plus the pro-rata share of the losing pool
    pub payout: u64,
}

impl SettlementQuote {
    pub fn total_disbursed(&self) -> Option<u64> {
        self.payout
            .checked_add(self.platform_fee)?
            .checked_add(self.developer_fee)
    }
}

/// Computes and applies the payout of a single stake.
///
/// All arithmetic is on base units in u128 with checked multiplication, and
/// every division floors. Market pools are final once the outcome is
/// announced, so quotes do not depend on settlement order.
pub struct SettlementEngine;

impl SettlementEngine {
    /// Split the fee on `amount` into (platform, developer) portions.
    ///
    /// The total fee is floored once over the combined rate and the
    /// developer portion is whatever remains after the floored platform
    /// portion.
    pub fn fee_split(
        amount: u64,
        fee_bps: u16,
        developer_fee_bps: u16,
    ) -> Result<(u64, u64), ProgramError> {
        let amount = amount as u128;
        let total_bps = fee_bps as u128 + developer_fee_bps as u128;

        let total_fee = amount
            .checked_mul(total_bps)
            .ok_or(EscrowError::ArithmeticOverflow)?
            / BPS_DENOMINATOR as u128;
        let platform_fee = amount
            .checked_mul(fee_bps as u128)
            .ok_or(EscrowError::ArithmeticOverflow)?
            / BPS_DENOMINATOR as u128;
        let developer_fee = total_fee
            .checked_sub(platform_fee)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        Ok((to_u64(platform_fee)?, to_u64(developer_fee)?))
    }

    /// Price a stake against a decided market without moving funds.
    pub fn quote(market: &Market, stake: &Stake) -> Result<SettlementQuote, ProgramError> {
        let winner = market
            .outcome
            .winner()
            .ok_or(EscrowError::OutcomeNotAnnounced)?;

        if stake.side != winner {
            return Ok(SettlementQuote::default());
        }

        let (platform_fee, developer_fee) =
            Self::fee_split(stake.amount, market.fee_bps, market.developer_fee_bps)?;
        let net_stake = (stake.amount as u128)
            .checked_sub(platform_fee as u128 + developer_fee as u128)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        let winning_pool = market.pool(winner);
        let losing_pool = market.pool(winner.opposite());

        // A winning stake is part of the winning pool, so an empty pool here
        // means corrupted totals. Pay the net stake back and nothing more.
        let share_of_losing_pool = if winning_pool == 0 {
            msg!("Winning pool is empty, skipping losing pool share");
            0
        } else {
            net_stake
                .checked_mul(losing_pool)
                .ok_or(EscrowError::ArithmeticOverflow)?
                / winning_pool
        };

        let payout = net_stake
            .checked_add(share_of_losing_pool)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        Ok(SettlementQuote {
            won: true,
            platform_fee,
            developer_fee,
            payout: to_u64(payout)?,
        })
    }

    /// Settle `stake` on behalf of `caller`, paying out through `ledger`.
    pub fn settle(
        market: &Market,
        market_key: &Pubkey,
        stake: &mut Stake,
        caller: &Pubkey,
        ledger: &mut dyn Ledger,
    ) -> Result<SettlementQuote, ProgramError> {
        if stake.market != *market_key {
            return Err(EscrowError::StakeMarketMismatch.into());
        }
        if stake.owner != *caller {
            msg!("Caller {} does not own this stake", caller);
            return Err(EscrowError::Unauthorized.into());
        }
        if stake.settled {
            return Err(EscrowError::AlreadySettled.into());
        }

        let quote = Self::quote(market, stake)?;

        let total = quote
            .total_disbursed()
            .ok_or(EscrowError::ArithmeticOverflow)?;
        let available = ledger.vault_balance()?;
        if available < total {
            msg!("Vault holds {} but settlement needs {}", available, total);
            return Err(EscrowError::InsufficientVaultFunds.into());
        }

        if quote.platform_fee > 0 {
            ledger.debit(Recipient::PlatformFee, quote.platform_fee)?;
        }
        if quote.developer_fee > 0 {
            ledger.debit(Recipient::DeveloperFee, quote.developer_fee)?;
        }
        if quote.payout > 0 {
            ledger.debit(Recipient::Owner, quote.payout)?;
        }

        stake.settled = true;
        stake.payout = quote.payout;

        Ok(quote)
    }
}

fn to_u64(value: u128) -> Result<u64, ProgramError> {
    u64::try_from(value).map_err(|_| EscrowError::ArithmeticOverflow.into())
}
