//! Program events, logged as base58-encoded borsh payloads

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{msg, pubkey::Pubkey};

use crate::state::Side;

/// Event type discriminator
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq)]
pub enum EventType {
    MarketOpened = 1,
    StakePlaced = 2,
    BettingClosed = 3,
    OutcomeAnnounced = 4,
    StakeSettled = 5,
}

/// Base event trait
pub trait Event: BorshSerialize {
    fn event_type() -> EventType;

    fn emit(&self) {
        msg!("PARI_MUTUEL_ESCROW_EVENT");
        msg!("TYPE:{:?}", Self::event_type());

        if let Ok(data) = self.try_to_vec() {
            msg!("DATA:{}", bs58::encode(&data).into_string());
        }
    }
}

#[macro_export]
macro_rules! define_event {
    ($name:ident { $($field:ident: $type:ty),* $(,)? }) => {
        #[derive(::borsh::BorshSerialize, ::borsh::BorshDeserialize, Debug, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: $type,)*
        }

        impl $crate::events::Event for $name {
            fn event_type() -> $crate::events::EventType {
                $crate::events::EventType::$name
            }
        }
    };
}

define_event!(MarketOpened {
    market: Pubkey,
    market_id: u64,
    authority: Pubkey,
    fee_bps: u16,
    developer_fee_bps: u16,
    token_mint: Option<Pubkey>,
});

define_event!(StakePlaced {
    market: Pubkey,
    owner: Pubkey,
    side: Side,
    amount: u64,
    pool_a: u128,
    pool_b: u128,
});

define_event!(BettingClosed {
    market: Pubkey,
    pool_a: u128,
    pool_b: u128,
});

define_event!(OutcomeAnnounced {
    market: Pubkey,
    winner: Side,
});

define_event!(StakeSettled {
    market: Pubkey,
    owner: Pubkey,
    won: bool,
    payout: u64,
    platform_fee: u64,
    developer_fee: u64,
});
