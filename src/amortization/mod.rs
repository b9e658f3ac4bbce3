//! Amortization scheduling for a single balance

mod closed_form;
mod rate;
mod schedule;
mod scheduler;

pub use closed_form::{
    fv_annuity_ordinary, fv_lump_sum, level_payment, periods_to_payoff, pv_annuity_ordinary,
};
pub use rate::{RatePeriod, RatePolicy};
pub use schedule::{Schedule, ScheduleEntry, ScheduleSummary};
pub use scheduler::{
    amortize_period, generate_schedule, schedule_for_term, solve_payment, DEFAULT_PERIOD_CAP,
};
