//! Load balances from CSV
//!
//! Expected header:
//! `id,principal,apr,minimum_payment,elected_payment,intro_apr,intro_periods`
//! The last three columns may be left empty.

use csv::{Reader, Trim};
use std::io::Read;
use std::path::Path;

use super::Balance;
use crate::amortization::RatePolicy;
use crate::error::LoadError;

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    principal: f64,
    apr: f64,
    minimum_payment: f64,
    #[serde(default)]
    elected_payment: Option<f64>,
    #[serde(default)]
    intro_apr: Option<f64>,
    #[serde(default)]
    intro_periods: Option<u32>,
}

impl CsvRow {
    fn into_balance(self) -> Result<Balance, LoadError> {
        let rate = match (self.intro_apr, self.intro_periods) {
            (None, None) => RatePolicy::fixed(self.apr),
            (Some(intro_apr), Some(periods)) => {
                RatePolicy::introductory(intro_apr, periods, self.apr)
            }
            _ => {
                return Err(LoadError::Invalid {
                    what: format!("balance '{}'", self.id),
                    reason: "intro_apr and intro_periods must be given together".to_string(),
                })
            }
        };

        Ok(Balance {
            id: self.id,
            principal: self.principal,
            rate,
            minimum_payment: self.minimum_payment,
            elected_payment: self.elected_payment,
        })
    }
}

/// Load all balances from a CSV file
pub fn load_balances<P: AsRef<Path>>(path: P) -> Result<Vec<Balance>, LoadError> {
    let file = std::fs::File::open(path.as_ref())?;
    load_balances_from_reader(file)
}

/// Load balances from any reader (e.g., string buffer, stdin)
pub fn load_balances_from_reader<R: Read>(reader: R) -> Result<Vec<Balance>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    read_rows(&mut csv_reader)
}

fn read_rows<R: Read>(reader: &mut Reader<R>) -> Result<Vec<Balance>, LoadError> {
    let mut balances = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        balances.push(row.into_balance()?);
    }

    log::debug!("loaded {} balances", balances.len());
    Ok(balances)
}
