pub mod assertions;
pub mod message_exchange;

pub use assertions::assert_worlds_match;
pub use message_exchange::{exchange_messages, tick_and_exchange, tick_and_exchange_n_times, TestClient};
pub use test_prefabs::{test_prefabs, BARREL, CRATE, CRAWLER, POUCH};
