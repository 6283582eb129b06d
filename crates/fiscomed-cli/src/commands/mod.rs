//! Command implementations

mod core;
mod rules;
mod seed;
mod transactions;

pub use core::{cmd_init, cmd_serve, cmd_status, open_db};
pub use rules::cmd_rules;
pub use seed::cmd_seed;
pub use transactions::{cmd_add, cmd_classify, cmd_summary, cmd_transactions, cmd_validate};
