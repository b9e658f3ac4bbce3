//! Savings growth: compound projections and certificates of deposit

mod certificate;
mod projector;

pub use certificate::{
    early_withdrawal_value, project_certificate, CertificateOutcome, CertificateTerms,
};
pub use projector::{effective_annual_yield, project, ChartPoint, GrowthProjection, GrowthSummary};
