//! Scenario comparison: rank competing offers by net benefit

mod comparator;
mod effective_rate;
mod runner;

pub use comparator::{compare, FeeModel, RankedScenario, ScenarioInput, ScenarioRun};
pub use effective_rate::{effective_apr_percent, present_value};
pub use runner::{
    CertificateOffer, ComparisonRequest, DebtOffer, OfferSet, SavingsOffer, ScenarioRunner,
};
