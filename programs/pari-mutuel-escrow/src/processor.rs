use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program_error::ProgramError,
    pubkey::Pubkey,
    rent::Rent,
    sysvar::Sysvar,
};

use crate::{
    account_validation::{
        validate_pda, validate_recipient, validate_signer, validate_uninitialized,
        validate_writable,
    },
    cpi::{create_pda_account, create_token_vault, transfer_lamports, unpack_token_account},
    engine::{MarketController, MarketParams, SettlementEngine},
    error::EscrowError,
    events::{BettingClosed, Event, MarketOpened, OutcomeAnnounced, StakePlaced, StakeSettled},
    instruction::{EscrowInstruction, OpenMarketParams},
    pda::{as_signer_seeds, with_bump, MarketPDA, StakePDA, VaultPDA},
    state::{Asset, Market, Side, Stake},
    vault::{Counterparties, EscrowVault, NativeVault, TokenVault},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = EscrowInstruction::unpack(instruction_data)?;

        match instruction {
            EscrowInstruction::OpenMarket { params } => {
                msg!("Instruction: OpenMarket");
                Self::process_open_market(program_id, accounts, params)
            }
            EscrowInstruction::PlaceStake { side, amount } => {
                msg!("Instruction: PlaceStake");
                Self::process_place_stake(program_id, accounts, side, amount)
            }
            EscrowInstruction::CloseBetting => {
                msg!("Instruction: CloseBetting");
                Self::process_close_betting(program_id, accounts)
            }
            EscrowInstruction::AnnounceOutcome { winner } => {
                msg!("Instruction: AnnounceOutcome");
                Self::process_announce_outcome(program_id, accounts, winner)
            }
            EscrowInstruction::SettleStake => {
                msg!("Instruction: SettleStake");
                Self::process_settle_stake(program_id, accounts)
            }
        }
    }

    fn process_open_market(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        params: OpenMarketParams,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority = next_account_info(account_info_iter)?;
        let market_account = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;
        let fee_recipient = next_account_info(account_info_iter)?;
        let developer_fee_recipient = next_account_info(account_info_iter)?;

        validate_signer(authority)?;
        validate_writable(market_account)?;

        let (market_key, bump) = MarketPDA::derive(program_id, params.market_id);
        validate_pda(market_account, &market_key)?;
        validate_uninitialized(market_account, EscrowError::MarketAlreadyExists)?;
        let (vault_key, vault_bump) = VaultPDA::derive(program_id, &market_key);

        let asset = match params.token_mint {
            Some(mint) => Asset::Token { mint },
            None => Asset::Native,
        };
        let market = MarketController::open(
            MarketParams {
                market_id: params.market_id,
                outcome_a_name: params.outcome_a_name,
                outcome_b_name: params.outcome_b_name,
                fee_bps: params.fee_bps,
                developer_fee_bps: params.developer_fee_bps,
                fee_recipient: params.fee_recipient,
                developer_fee_recipient: params.developer_fee_recipient,
                asset,
            },
            *authority.key,
            bump,
            vault_bump,
        )?;

        let mut recipients = vec![fee_recipient];
        validate_recipient(fee_recipient, &market.fee_recipient)?;
        if let Some(expected) = market.developer_fee_recipient {
            validate_recipient(developer_fee_recipient, &expected)?;
            recipients.push(developer_fee_recipient);
        }
        if recipients.iter().any(|account| account.key == &market_key) {
            return Err(EscrowError::InvalidFeeRecipient.into());
        }

        let market_seeds = with_bump(MarketPDA::seeds(market.market_id), bump);
        create_pda_account(
            authority,
            market_account,
            Market::LEN,
            program_id,
            system_program,
            &as_signer_seeds(&market_seeds),
        )?;

        if let Asset::Token { mint } = market.asset {
            let mint_account = next_account_info(account_info_iter)?;
            let vault_account = next_account_info(account_info_iter)?;
            let token_program = next_account_info(account_info_iter)?;

            if mint_account.key != &mint || mint_account.owner != &spl_token::ID {
                return Err(EscrowError::InvalidMint.into());
            }
            if token_program.key != &spl_token::ID {
                return Err(ProgramError::IncorrectProgramId);
            }
            validate_writable(vault_account)?;
            validate_pda(vault_account, &vault_key)?;

            for recipient in &recipients {
                unpack_token_account(recipient, &mint)?;
            }

            let vault_seeds = with_bump(VaultPDA::seeds(&market_key), vault_bump);
            create_token_vault(
                authority,
                vault_account,
                mint_account,
                &market_key,
                token_program,
                system_program,
                &as_signer_seeds(&vault_seeds),
            )?;
        } else {
            for recipient in &recipients {
                Self::fund_rent_exemption(authority, recipient, system_program)?;
            }
        }

        market.save(market_account)?;

        MarketOpened {
            market: market_key,
            market_id: market.market_id,
            authority: market.authority,
            fee_bps: market.fee_bps,
            developer_fee_bps: market.developer_fee_bps,
            token_mint: market.asset.mint(),
        }
        .emit();

        msg!(
            "Opened {} market {}: {} vs {}",
            market.asset.name(),
            market.market_id,
            market.outcome_a_name,
            market.outcome_b_name
        );
        Ok(())
    }

    fn process_place_stake(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        side: Side,
        amount: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner = next_account_info(account_info_iter)?;
        let market_account = next_account_info(account_info_iter)?;
        let stake_account = next_account_info(account_info_iter)?;
        let system_program = next_account_info(account_info_iter)?;

        validate_signer(owner)?;
        validate_writable(market_account)?;
        validate_writable(stake_account)?;

        let mut market = Market::load(market_account, program_id)?;
        if !market.betting_open {
            return Err(EscrowError::BettingClosed.into());
        }
        let (stake_key, stake_bump) = StakePDA::derive(program_id, market_account.key, owner.key);
        validate_pda(stake_account, &stake_key)?;
        validate_uninitialized(stake_account, EscrowError::DuplicateStake)?;

        let mut vault = match market.asset {
            Asset::Native => EscrowVault::Native(NativeVault::new(
                market_account,
                Counterparties::depositor(owner, owner),
                Some(system_program),
            )?),
            Asset::Token { mint } => {
                let owner_token_account = next_account_info(account_info_iter)?;
                let vault_account = next_account_info(account_info_iter)?;
                let token_program = next_account_info(account_info_iter)?;
                Self::validate_token_vault(program_id, &market, market_account, vault_account)?;

                EscrowVault::Token(TokenVault::new(
                    &market,
                    mint,
                    market_account,
                    vault_account,
                    Counterparties::depositor(owner, owner_token_account),
                    token_program,
                )?)
            }
        };

        let mut stake = MarketController::place_stake(
            &mut market,
            market_account.key,
            owner.key,
            side,
            amount,
            &mut vault,
        )?;
        stake.bump = stake_bump;

        let stake_seeds = with_bump(StakePDA::seeds(market_account.key, owner.key), stake_bump);
        create_pda_account(
            owner,
            stake_account,
            Stake::LEN,
            program_id,
            system_program,
            &as_signer_seeds(&stake_seeds),
        )?;

        stake.save(stake_account)?;
        market.save(market_account)?;

        StakePlaced {
            market: *market_account.key,
            owner: *owner.key,
            side,
            amount,
            pool_a: market.pool_a,
            pool_b: market.pool_b,
        }
        .emit();

        msg!("Staked {} on {}", amount, market.outcome_name(side));
        Ok(())
    }

    fn process_close_betting(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority = next_account_info(account_info_iter)?;
        let market_account = next_account_info(account_info_iter)?;

        validate_signer(authority)?;
        validate_writable(market_account)?;

        let mut market = Market::load(market_account, program_id)?;
        MarketController::close_betting(&mut market, authority.key)?;
        market.save(market_account)?;

        BettingClosed {
            market: *market_account.key,
            pool_a: market.pool_a,
            pool_b: market.pool_b,
        }
        .emit();

        msg!("Betting closed on market {}", market.market_id);
        Ok(())
    }

    fn process_announce_outcome(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        winner: Side,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority = next_account_info(account_info_iter)?;
        let market_account = next_account_info(account_info_iter)?;

        validate_signer(authority)?;
        validate_writable(market_account)?;

        let mut market = Market::load(market_account, program_id)?;
        MarketController::announce_outcome(&mut market, authority.key, winner)?;
        market.save(market_account)?;

        OutcomeAnnounced {
            market: *market_account.key,
            winner,
        }
        .emit();

        msg!("Market {} resolved: {}", market.market_id, market.outcome_name(winner));
        Ok(())
    }

    fn process_settle_stake(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner = next_account_info(account_info_iter)?;
        let market_account = next_account_info(account_info_iter)?;
        let stake_account = next_account_info(account_info_iter)?;
        let fee_recipient = next_account_info(account_info_iter)?;
        let developer_fee_recipient = next_account_info(account_info_iter)?;

        validate_signer(owner)?;
        validate_writable(market_account)?;
        validate_writable(stake_account)?;

        let market = Market::load(market_account, program_id)?;
        let mut stake = Stake::load(stake_account, program_id)?;

        validate_recipient(fee_recipient, &market.fee_recipient)?;
        let developer_fee = match market.developer_fee_recipient {
            Some(expected) => {
                validate_recipient(developer_fee_recipient, &expected)?;
                Some(developer_fee_recipient)
            }
            None => None,
        };

        let mut vault = match market.asset {
            Asset::Native => EscrowVault::Native(NativeVault::new(
                market_account,
                Counterparties {
                    owner,
                    owner_funds: owner,
                    platform_fee: Some(fee_recipient),
                    developer_fee,
                },
                None,
            )?),
            Asset::Token { mint } => {
                let owner_token_account = next_account_info(account_info_iter)?;
                let vault_account = next_account_info(account_info_iter)?;
                let token_program = next_account_info(account_info_iter)?;
                Self::validate_token_vault(program_id, &market, market_account, vault_account)?;

                EscrowVault::Token(TokenVault::new(
                    &market,
                    mint,
                    market_account,
                    vault_account,
                    Counterparties {
                        owner,
                        owner_funds: owner_token_account,
                        platform_fee: Some(fee_recipient),
                        developer_fee,
                    },
                    token_program,
                )?)
            }
        };

        let quote = SettlementEngine::settle(
            &market,
            market_account.key,
            &mut stake,
            owner.key,
            &mut vault,
        )?;
        stake.save(stake_account)?;

        StakeSettled {
            market: *market_account.key,
            owner: *owner.key,
            won: quote.won,
            payout: quote.payout,
            platform_fee: quote.platform_fee,
            developer_fee: quote.developer_fee,
        }
        .emit();

        msg!("Settled stake of {}: payout {}", stake.amount, quote.payout);
        Ok(())
    }

    /// Native fees are paid by moving lamports, which the runtime rejects
    /// when it leaves the recipient below rent exemption.
    fn fund_rent_exemption<'a>(
        payer: &AccountInfo<'a>,
        recipient: &AccountInfo<'a>,
        system_program: &AccountInfo<'a>,
    ) -> ProgramResult {
        let required = Rent::get()?.minimum_balance(recipient.data_len());
        let top_up = required.saturating_sub(recipient.lamports());
        if top_up > 0 {
            validate_writable(recipient)?;
            msg!("Funding fee recipient {} with {} lamports", recipient.key, top_up);
            transfer_lamports(payer, recipient, top_up, system_program)?;
        }
        Ok(())
    }

    fn validate_token_vault(
        program_id: &Pubkey,
        market: &Market,
        market_account: &AccountInfo,
        vault_account: &AccountInfo,
    ) -> ProgramResult {
        validate_writable(vault_account)?;
        let vault_key = VaultPDA::address(program_id, market_account.key, market.vault_bump)?;
        validate_pda(vault_account, &vault_key)
    }
}
