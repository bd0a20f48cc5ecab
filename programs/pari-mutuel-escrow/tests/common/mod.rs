#![allow(dead_code)]

use borsh::BorshDeserialize;
use pari_mutuel_escrow::{
    instruction::{self, OpenMarketParams},
    pda::{MarketPDA, StakePDA},
    state::{Market, Side, Stake},
    EscrowError,
};
use solana_program_test::{processor, BanksClientError, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::Account,
    instruction::{Instruction, InstructionError},
    native_token::LAMPORTS_PER_SOL,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction, system_program,
    transaction::{Transaction, TransactionError},
};

pub const STARTING_LAMPORTS: u64 = 10 * LAMPORTS_PER_SOL;

pub fn program_test() -> ProgramTest {
    let mut program_test = ProgramTest::new(
        "pari_mutuel_escrow",
        pari_mutuel_escrow::id(),
        processor!(pari_mutuel_escrow::process),
    );
    program_test.prefer_bpf(false);
    program_test
}

/// Give `key` a rent-exempt system balance at genesis
pub fn fund(program_test: &mut ProgramTest, key: &Pubkey) {
    program_test.add_account(
        *key,
        Account {
            lamports: STARTING_LAMPORTS,
            data: vec![],
            owner: system_program::id(),
            executable: false,
            rent_epoch: 0,
        },
    );
}

pub async fn send(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let blockhash = context.banks_client.get_latest_blockhash().await?;
    context.last_blockhash = blockhash;
    let mut all_signers = vec![&context.payer];
    all_signers.extend_from_slice(signers);
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &all_signers,
        blockhash,
    );
    context.banks_client.process_transaction(transaction).await
}

pub fn assert_escrow_error(result: Result<(), BanksClientError>, expected: EscrowError) {
    let err = result.expect_err("transaction should fail").unwrap();
    assert_eq!(
        err,
        TransactionError::InstructionError(0, InstructionError::Custom(expected as u32))
    );
}

pub fn market_params(market_id: u64, fee_bps: u16, fee_recipient: Pubkey) -> OpenMarketParams {
    OpenMarketParams {
        market_id,
        outcome_a_name: "Home".to_string(),
        outcome_b_name: "Away".to_string(),
        fee_bps,
        developer_fee_bps: 0,
        fee_recipient,
        developer_fee_recipient: None,
        token_mint: None,
    }
}

pub async fn open_market(
    context: &mut ProgramTestContext,
    authority: &Keypair,
    params: OpenMarketParams,
) -> Result<(), BanksClientError> {
    let ix = instruction::open_market(&pari_mutuel_escrow::id(), &authority.pubkey(), params)
        .unwrap();
    send(context, &[ix], &[authority]).await
}

pub async fn stake_native(
    context: &mut ProgramTestContext,
    owner: &Keypair,
    market_id: u64,
    side: Side,
    amount: u64,
) -> Result<(), BanksClientError> {
    let ix = instruction::place_stake(
        &pari_mutuel_escrow::id(),
        &owner.pubkey(),
        market_id,
        side,
        amount,
        None,
    )
    .unwrap();
    send(context, &[ix], &[owner]).await
}

pub async fn close_and_announce(
    context: &mut ProgramTestContext,
    authority: &Keypair,
    market_id: u64,
    winner: Side,
) {
    let program_id = pari_mutuel_escrow::id();
    let close = instruction::close_betting(&program_id, &authority.pubkey(), market_id).unwrap();
    let announce =
        instruction::announce_outcome(&program_id, &authority.pubkey(), market_id, winner)
            .unwrap();
    send(context, &[close], &[authority]).await.unwrap();
    send(context, &[announce], &[authority]).await.unwrap();
}

pub async fn settle_native(
    context: &mut ProgramTestContext,
    owner: &Keypair,
    market_id: u64,
    fee_recipient: &Pubkey,
    developer_fee_recipient: Option<&Pubkey>,
) -> Result<(), BanksClientError> {
    let ix = instruction::settle_stake(
        &pari_mutuel_escrow::id(),
        &owner.pubkey(),
        market_id,
        fee_recipient,
        developer_fee_recipient,
        None,
    )
    .unwrap();
    send(context, &[ix], &[owner]).await
}

pub async fn balance(context: &mut ProgramTestContext, key: &Pubkey) -> u64 {
    context.banks_client.get_balance(*key).await.unwrap()
}

pub async fn load_market(context: &mut ProgramTestContext, market_id: u64) -> Market {
    let (key, _) = MarketPDA::derive(&pari_mutuel_escrow::id(), market_id);
    let account = context.banks_client.get_account(key).await.unwrap().unwrap();
    Market::deserialize(&mut &account.data[..]).unwrap()
}

pub async fn load_stake(context: &mut ProgramTestContext, market_id: u64, owner: &Pubkey) -> Stake {
    let (market, _) = MarketPDA::derive(&pari_mutuel_escrow::id(), market_id);
    let (key, _) = StakePDA::derive(&pari_mutuel_escrow::id(), &market, owner);
    let account = context.banks_client.get_account(key).await.unwrap().unwrap();
    Stake::deserialize(&mut &account.data[..]).unwrap()
}

/// Lamports held by a native market above its rent reserve
pub async fn native_vault_balance(context: &mut ProgramTestContext, market_id: u64) -> u64 {
    let (key, _) = MarketPDA::derive(&pari_mutuel_escrow::id(), market_id);
    let rent = context.banks_client.get_rent().await.unwrap();
    balance(context, &key).await - rent.minimum_balance(Market::LEN)
}

pub async fn create_mint(context: &mut ProgramTestContext, mint: &Keypair) {
    let rent = context.banks_client.get_rent().await.unwrap();
    let payer = context.payer.pubkey();
    let instructions = [
        system_instruction::create_account(
            &payer,
            &mint.pubkey(),
            rent.minimum_balance(spl_token::state::Mint::LEN),
            spl_token::state::Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint2(&spl_token::id(), &mint.pubkey(), &payer, None, 0)
            .unwrap(),
    ];
    send(context, &instructions, &[mint]).await.unwrap();
}

/// Create a token account for `owner` holding `amount` freshly minted tokens
pub async fn create_token_account(
    context: &mut ProgramTestContext,
    mint: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Pubkey {
    let account = Keypair::new();
    let rent = context.banks_client.get_rent().await.unwrap();
    let payer = context.payer.pubkey();
    let mut instructions = vec![
        system_instruction::create_account(
            &payer,
            &account.pubkey(),
            rent.minimum_balance(spl_token::state::Account::LEN),
            spl_token::state::Account::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_account3(
            &spl_token::id(),
            &account.pubkey(),
            mint,
            owner,
        )
        .unwrap(),
    ];
    if amount > 0 {
        instructions.push(
            spl_token::instruction::mint_to(
                &spl_token::id(),
                mint,
                &account.pubkey(),
                &payer,
                &[],
                amount,
            )
            .unwrap(),
        );
    }
    send(context, &instructions, &[&account]).await.unwrap();
    account.pubkey()
}

pub async fn token_balance(context: &mut ProgramTestContext, account: &Pubkey) -> u64 {
    let account = context.banks_client.get_account(*account).await.unwrap().unwrap();
    spl_token::state::Account::unpack(&account.data).unwrap().amount
}
