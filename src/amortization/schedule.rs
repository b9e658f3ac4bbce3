//! Schedule output structures

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::NonConvergent;

/// One period of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Period number (1-indexed)
    pub period: u32,

    /// Amount paid this period (principal + interest)
    pub payment: f64,

    /// Portion of the payment that reduced the balance.
    /// Negative when the payment does not cover interest.
    pub principal: f64,

    /// Interest accrued this period
    pub interest: f64,

    /// Balance after this period's payment
    pub remaining_balance: f64,

    /// Annual percentage rate applied this period
    pub annual_rate: f64,
}

/// Complete amortization schedule for one balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Starting balance
    pub principal: f64,

    /// Period rows in order
    pub entries: Vec<ScheduleEntry>,

    /// Iteration bound that was used
    pub period_cap: u32,

    /// Set when the cap was reached with a balance outstanding
    pub non_convergent: bool,
}

impl Schedule {
    pub fn new(principal: f64, period_cap: u32) -> Self {
        Self {
            principal,
            entries: Vec::new(),
            period_cap,
            non_convergent: false,
        }
    }

    /// Add a period row
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Balance after the last period (the starting balance if nothing ran)
    pub fn final_balance(&self) -> f64 {
        self.entries
            .last()
            .map(|e| e.remaining_balance)
            .unwrap_or(self.principal)
    }

    pub fn is_paid_off(&self) -> bool {
        self.final_balance() == 0.0
    }

    /// Number of periods to reach a zero balance, `None` if never reached
    pub fn months_to_payoff(&self) -> Option<u32> {
        if self.is_paid_off() {
            Some(self.entries.len() as u32)
        } else {
            None
        }
    }

    /// Calendar month of the final payment when the first payment is due
    /// one month after `start`
    pub fn payoff_date(&self, start: NaiveDate) -> Option<NaiveDate> {
        let months = self.months_to_payoff()?;
        start.checked_add_months(Months::new(months))
    }

    pub fn total_interest(&self) -> f64 {
        self.entries.iter().map(|e| e.interest).sum()
    }

    pub fn total_paid(&self) -> f64 {
        self.entries.iter().map(|e| e.payment).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.entries.iter().map(|e| e.principal).sum()
    }

    /// Warning for callers to surface when the cap was hit
    pub fn warning(&self) -> Option<NonConvergent> {
        if self.non_convergent {
            Some(NonConvergent {
                period_cap: self.period_cap,
                remaining_balance: self.final_balance(),
            })
        } else {
            None
        }
    }

    /// Get summary statistics
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            principal: self.principal,
            periods: self.entries.len() as u32,
            total_paid: self.total_paid(),
            total_interest: self.total_interest(),
            final_balance: self.final_balance(),
            months_to_payoff: self.months_to_payoff(),
            non_convergent: self.non_convergent,
        }
    }
}

/// Summary statistics for a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub principal: f64,
    pub periods: u32,
    pub total_paid: f64,
    pub total_interest: f64,
    pub final_balance: f64,
    pub months_to_payoff: Option<u32>,
    pub non_convergent: bool,
}
