//! Debt payoff strategies across multiple balances

mod allocator;
mod policy;

pub use allocator::{allocate, allocate_all, AllocationResult, PayoffEvent, TimelinePoint};
pub use policy::AllocationPolicy;
