use serde::Serialize;
use thiserror::Error;

pub const MONTHS_PER_YEAR: usize = 12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationInput {
    pub monthly_contribution: f64,
    pub annual_return_percent: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    pub monthly_rate: f64,
    pub cumulative_contribution: Vec<f64>,
    pub cumulative_value: Vec<f64>,
}

impl MonthlySeries {
    pub fn len(&self) -> usize {
        self.cumulative_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative_value.is_empty()
    }

    pub fn years(&self) -> usize {
        self.len() / MONTHS_PER_YEAR
    }

    pub fn points(&self) -> impl Iterator<Item = MonthlyPoint> + '_ {
        self.cumulative_contribution
            .iter()
            .zip(&self.cumulative_value)
            .enumerate()
            .map(|(month, (&contribution, &value))| MonthlyPoint {
                month: month as u32,
                contribution,
                value,
            })
    }

    pub fn last(&self) -> Option<MonthlyPoint> {
        self.points().last()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month: u32,
    pub contribution: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyPoint {
    pub year: u32,
    pub contribution: f64,
    pub value: f64,
}
