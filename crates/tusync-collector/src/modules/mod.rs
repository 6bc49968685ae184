//! 동기화 모듈.

pub mod board_sync;
pub mod calendar;
pub mod chip_sync;
pub mod daily_sync;
pub mod dataset_sync;
pub mod roster_sync;

pub use board_sync::{sync_dc_boards, sync_ths_boards};
pub use calendar::trading_dates;
pub use chip_sync::sync_chips;
pub use daily_sync::{sync_daily_by_date, sync_daily_by_range};
pub use dataset_sync::{sync_dataset_by_dates, sync_dataset_for_date};
pub use roster_sync::{sync_base_data, sync_hot_money_roster, sync_stock_list};
