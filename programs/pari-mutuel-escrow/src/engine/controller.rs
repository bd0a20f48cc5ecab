use solana_program::{
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{
    constants::{MARKET_DISCRIMINATOR, MAX_OUTCOME_NAME_LEN, MAX_TOTAL_FEE_BPS},
    engine::Ledger,
    error::EscrowError,
    state::{Asset, Market, Outcome, Side, Stake},
};

/// Parameters chosen by the authority when opening a market
#[derive(Debug, Clone)]
pub struct MarketParams {
    pub market_id: u64,
    pub outcome_a_name: String,
    pub outcome_b_name: String,
    pub fee_bps: u16,
    pub developer_fee_bps: u16,
    pub fee_recipient: Pubkey,
    pub developer_fee_recipient: Option<Pubkey>,
    pub asset: Asset,
}

/// Validates and applies the betting-phase state transitions of a market
pub struct MarketController;

impl MarketController {
    /// Build a fresh market: betting open, outcome undecided, empty pools.
    pub fn open(
        params: MarketParams,
        authority: Pubkey,
        bump: u8,
        vault_bump: u8,
    ) -> Result<Market, ProgramError> {
        Self::validate_outcome_name(&params.outcome_a_name)?;
        Self::validate_outcome_name(&params.outcome_b_name)?;
        Self::validate_fees(
            params.fee_bps,
            params.developer_fee_bps,
            params.developer_fee_recipient.as_ref(),
        )?;

        Ok(Market {
            discriminator: MARKET_DISCRIMINATOR,
            bump,
            vault_bump,
            market_id: params.market_id,
            authority,
            outcome_a_name: params.outcome_a_name,
            outcome_b_name: params.outcome_b_name,
            fee_bps: params.fee_bps,
            developer_fee_bps: params.developer_fee_bps,
            fee_recipient: params.fee_recipient,
            developer_fee_recipient: params.developer_fee_recipient,
            asset: params.asset,
            betting_open: true,
            outcome: Outcome::Undecided,
            pool_a: 0,
            pool_b: 0,
            count_a: 0,
            count_b: 0,
        })
    }

    /// Combined fees may not exceed 100% of a stake
    pub fn validate_fees(
        fee_bps: u16,
        developer_fee_bps: u16,
        developer_fee_recipient: Option<&Pubkey>,
    ) -> ProgramResult {
        let total = fee_bps as u32 + developer_fee_bps as u32;
        if total > MAX_TOTAL_FEE_BPS {
            msg!("Fee schedule {} + {} bps exceeds 100%", fee_bps, developer_fee_bps);
            return Err(EscrowError::InvalidFeeConfiguration.into());
        }
        if developer_fee_bps > 0 && developer_fee_recipient.is_none() {
            msg!("Developer fee set without a developer fee recipient");
            return Err(EscrowError::InvalidFeeConfiguration.into());
        }
        Ok(())
    }

    fn validate_outcome_name(name: &str) -> ProgramResult {
        if name.is_empty() || name.len() > MAX_OUTCOME_NAME_LEN {
            return Err(EscrowError::InvalidStringLength.into());
        }
        Ok(())
    }

    /// Escrow `amount` on `side` and return the new stake record.
    ///
    /// The pool update is computed first, funds are then moved through the
    /// ledger, and only after that succeeds is the market mutated.
    pub fn place_stake(
        market: &mut Market,
        market_key: &Pubkey,
        owner: &Pubkey,
        side: Side,
        amount: u64,
        ledger: &mut dyn Ledger,
    ) -> Result<Stake, ProgramError> {
        if !market.betting_open {
            return Err(EscrowError::BettingClosed.into());
        }
        if amount == 0 {
            return Err(EscrowError::ZeroAmount.into());
        }

        let pool = market
            .pool(side)
            .checked_add(amount as u128)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        let count = market
            .count(side)
            .checked_add(1)
            .ok_or(EscrowError::ArithmeticOverflow)?;
        market
            .pool(side.opposite())
            .checked_add(pool)
            .ok_or(EscrowError::ArithmeticOverflow)?;

        ledger.credit(amount)?;

        match side {
            Side::A => {
                market.pool_a = pool;
                market.count_a = count;
            }
            Side::B => {
                market.pool_b = pool;
                market.count_b = count;
            }
        }

        Ok(Stake::new(*market_key, *owner, side, amount))
    }

    /// Stop accepting stakes. Irreversible.
    pub fn close_betting(market: &mut Market, caller: &Pubkey) -> ProgramResult {
        Self::require_authority(market, caller)?;
        if !market.betting_open {
            return Err(EscrowError::BettingAlreadyClosed.into());
        }
        market.betting_open = false;
        Ok(())
    }

    /// Record the winning side. Betting must already be closed.
    pub fn announce_outcome(market: &mut Market, caller: &Pubkey, winner: Side) -> ProgramResult {
        Self::require_authority(market, caller)?;
        if market.outcome != Outcome::Undecided {
            return Err(EscrowError::OutcomeAlreadyAnnounced.into());
        }
        if market.betting_open {
            return Err(EscrowError::BettingStillOpen.into());
        }
        market.outcome = winner.into();
        Ok(())
    }

    fn require_authority(market: &Market, caller: &Pubkey) -> ProgramResult {
        if market.authority != *caller {
            msg!("Caller {} is not the market authority", caller);
            return Err(EscrowError::Unauthorized.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryLedger;

    fn params() -> MarketParams {
        MarketParams {
            market_id: 1,
            outcome_a_name: "Fighter A".to_string(),
            outcome_b_name: "Fighter B".to_string(),
            fee_bps: 300,
            developer_fee_bps: 100,
            fee_recipient: Pubkey::new_unique(),
            developer_fee_recipient: Some(Pubkey::new_unique()),
            asset: Asset::Native,
        }
    }

    fn open_market(authority: Pubkey) -> Market {
        MarketController::open(params(), authority, 255, 255).unwrap()
    }

    #[test]
    fn test_open_starts_undecided_with_empty_pools() {
        let authority = Pubkey::new_unique();
        let market = open_market(authority);

        assert!(market.betting_open);
        assert_eq!(market.outcome, Outcome::Undecided);
        assert_eq!((market.pool_a, market.pool_b), (0, 0));
        assert_eq!((market.count_a, market.count_b), (0, 0));
        assert_eq!(market.authority, authority);
    }

    #[test]
    fn test_open_rejects_fees_over_100_percent() {
        let mut p = params();
        p.fee_bps = 9_000;
        p.developer_fee_bps = 1_001;
        assert_eq!(
            MarketController::open(p, Pubkey::new_unique(), 0, 0),
            Err(EscrowError::InvalidFeeConfiguration.into())
        );

        let mut p = params();
        p.fee_bps = 9_000;
        p.developer_fee_bps = 1_000;
        assert!(MarketController::open(p, Pubkey::new_unique(), 0, 0).is_ok());
    }

    #[test]
    fn test_open_requires_developer_recipient_for_developer_fee() {
        let mut p = params();
        p.developer_fee_recipient = None;
        assert_eq!(
            MarketController::open(p.clone(), Pubkey::new_unique(), 0, 0),
            Err(EscrowError::InvalidFeeConfiguration.into())
        );

        p.developer_fee_bps = 0;
        assert!(MarketController::open(p, Pubkey::new_unique(), 0, 0).is_ok());
    }

    #[test]
    fn test_open_validates_outcome_names() {
        let mut p = params();
        p.outcome_a_name = "x".repeat(MAX_OUTCOME_NAME_LEN + 1);
        assert_eq!(
            MarketController::open(p, Pubkey::new_unique(), 0, 0),
            Err(EscrowError::InvalidStringLength.into())
        );

        let mut p = params();
        p.outcome_b_name = String::new();
        assert_eq!(
            MarketController::open(p, Pubkey::new_unique(), 0, 0),
            Err(EscrowError::InvalidStringLength.into())
        );
    }

    #[test]
    fn test_place_stake_updates_pools_and_vault() {
        let mut market = open_market(Pubkey::new_unique());
        let market_key = Pubkey::new_unique();
        let mut ledger = MemoryLedger::default();

        let alice = Pubkey::new_unique();
        let stake = MarketController::place_stake(
            &mut market, &market_key, &alice, Side::A, 1_000, &mut ledger,
        )
        .unwrap();
        MarketController::place_stake(
            &mut market, &market_key, &Pubkey::new_unique(), Side::B, 800, &mut ledger,
        )
        .unwrap();
        MarketController::place_stake(
            &mut market, &market_key, &Pubkey::new_unique(), Side::A, 500, &mut ledger,
        )
        .unwrap();

        assert_eq!(stake.owner, alice);
        assert_eq!(stake.market, market_key);
        assert_eq!(stake.amount, 1_000);
        assert!(!stake.settled);
        assert_eq!(market.pool_a, 1_500);
        assert_eq!(market.pool_b, 800);
        assert_eq!(market.count_a, 2);
        assert_eq!(market.count_b, 1);
        assert_eq!(ledger.vault, 2_300);
    }

    #[test]
    fn test_zero_stake_rejected() {
        let mut market = open_market(Pubkey::new_unique());
        let mut ledger = MemoryLedger::default();
        let result = MarketController::place_stake(
            &mut market,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            Side::A,
            0,
            &mut ledger,
        );
        assert_eq!(result, Err(EscrowError::ZeroAmount.into()));
        assert_eq!(ledger.vault, 0);
    }

    #[test]
    fn test_no_stake_after_close() {
        let authority = Pubkey::new_unique();
        let mut market = open_market(authority);
        let mut ledger = MemoryLedger::default();

        MarketController::close_betting(&mut market, &authority).unwrap();
        assert!(!market.betting_open);

        for (side, amount) in [(Side::A, 10), (Side::B, 10), (Side::A, 0)] {
            let result = MarketController::place_stake(
                &mut market,
                &Pubkey::new_unique(),
                &Pubkey::new_unique(),
                side,
                amount,
                &mut ledger,
            );
            assert_eq!(result, Err(EscrowError::BettingClosed.into()));
        }
        assert_eq!(ledger.vault, 0);
        assert_eq!(market.pool_a + market.pool_b, 0);
    }

    #[test]
    fn test_pool_overflow_leaves_market_untouched() {
        let mut market = open_market(Pubkey::new_unique());
        market.pool_a = u128::MAX - 5;
        let before = market.clone();
        let mut ledger = MemoryLedger::default();

        let result = MarketController::place_stake(
            &mut market,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            Side::A,
            10,
            &mut ledger,
        );
        assert_eq!(result, Err(EscrowError::ArithmeticOverflow.into()));
        assert_eq!(market, before);
        assert_eq!(ledger.vault, 0);
    }

    #[test]
    fn test_close_betting_rules() {
        let authority = Pubkey::new_unique();
        let mut market = open_market(authority);

        assert_eq!(
            MarketController::close_betting(&mut market, &Pubkey::new_unique()),
            Err(EscrowError::Unauthorized.into())
        );
        assert!(market.betting_open);

        MarketController::close_betting(&mut market, &authority).unwrap();
        assert_eq!(
            MarketController::close_betting(&mut market, &authority),
            Err(EscrowError::BettingAlreadyClosed.into())
        );
    }

    #[test]
    fn test_announce_outcome_rules() {
        let authority = Pubkey::new_unique();
        let mut market = open_market(authority);

        assert_eq!(
            MarketController::announce_outcome(&mut market, &authority, Side::A),
            Err(EscrowError::BettingStillOpen.into())
        );

        MarketController::close_betting(&mut market, &authority).unwrap();
        assert_eq!(
            MarketController::announce_outcome(&mut market, &Pubkey::new_unique(), Side::A),
            Err(EscrowError::Unauthorized.into())
        );

        MarketController::announce_outcome(&mut market, &authority, Side::B).unwrap();
        assert_eq!(market.outcome, Outcome::OutcomeB);

        assert_eq!(
            MarketController::announce_outcome(&mut market, &authority, Side::A),
            Err(EscrowError::OutcomeAlreadyAnnounced.into())
        );
        assert_eq!(market.outcome, Outcome::OutcomeB);
    }
}
