//! Balance data structures and CSV loading

mod data;
pub mod loader;

pub use data::Balance;
pub use loader::{load_balances, load_balances_from_reader};
