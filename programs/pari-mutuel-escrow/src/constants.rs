// Seeds
pub const MARKET_SEED: &[u8] = b"market";
pub const STAKE_SEED: &[u8] = b"stake";
pub const VAULT_SEED: &[u8] = b"vault";

// Fee Constants
pub const BPS_DENOMINATOR: u64 = 10_000; // 100%
pub const MAX_TOTAL_FEE_BPS: u32 = 10_000;

// Market Constants
pub const MAX_OUTCOME_NAME_LEN: usize = 32; // bytes

// Account discriminators
pub const MARKET_DISCRIMINATOR: [u8; 8] = *b"PM_MRKT_";
pub const STAKE_DISCRIMINATOR: [u8; 8] = *b"PM_STAKE";
