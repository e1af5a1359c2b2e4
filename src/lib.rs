pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod terminal;
pub mod types;
pub mod use_cases;
pub mod utils;
pub mod view;

#[cfg(test)]
mod testing;

pub use api::{HttpLottoApi, LottoApi};
pub use config::Config;
pub use error::{Error, Result};
pub use render::Block;
pub use terminal::Terminal;
pub use types::*;
pub use use_cases::{Coupons, CouponDeletion, DrawLookup, HashtagDraws, HashtagOutcome, Outcome};
pub use view::{Confirm, Region, View};
