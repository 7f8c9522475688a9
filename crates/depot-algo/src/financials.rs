//! Operating summary and investment indicators for a solved network.

use crate::cost_matrix::CostMatrix;
use depot_core::{ClientId, DepotError, FacilityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FinancialError {
    #[error("expected {expected} annual cash flows, got {actual}")]
    HorizonMismatch { expected: usize, actual: usize },
    #[error("initial investment cannot be zero when computing ROI")]
    ZeroInvestment,
}

impl From<FinancialError> for DepotError {
    fn from(err: FinancialError) -> Self {
        DepotError::Validation(err.to_string())
    }
}

/// Revenue, costs and margin of one operating year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub revenue: f64,
    pub variable_cost: f64,
    pub fixed_cost: f64,
    pub margin: f64,
}

/// Revenue is `unit_revenue` per allocated client whose (facility, client)
/// edge has a defined cost; allocations without such an edge are ignored.
pub fn compute_financials(
    allocation: &BTreeMap<ClientId, FacilityId>,
    matrix: &CostMatrix,
    unit_revenue: f64,
    fixed_cost: f64,
) -> FinancialSummary {
    let lookup = matrix.cost_index();
    let matched: Vec<f64> = allocation
        .iter()
        .filter_map(|(client, facility)| lookup.get(&(facility, client)).copied())
        .collect();

    let variable_cost: f64 = matched.iter().sum();
    let revenue = matched.len() as f64 * unit_revenue;
    let summary = FinancialSummary {
        revenue,
        variable_cost,
        fixed_cost,
        margin: revenue - variable_cost - fixed_cost,
    };
    debug!(?summary, "financial summary computed");
    summary
}

/// Yearly savings versus the baseline network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnualSavings {
    /// Same amount every year of the horizon
    Constant(f64),
    /// One value per year; length must equal the horizon
    Yearly(Vec<f64>),
}

impl From<f64> for AnnualSavings {
    fn from(value: f64) -> Self {
        AnnualSavings::Constant(value)
    }
}

impl From<Vec<f64>> for AnnualSavings {
    fn from(values: Vec<f64>) -> Self {
        AnnualSavings::Yearly(values)
    }
}

impl AnnualSavings {
    pub fn cashflows(&self, horizon_years: usize) -> Result<Vec<f64>, FinancialError> {
        match self {
            AnnualSavings::Constant(value) => Ok(vec![*value; horizon_years]),
            AnnualSavings::Yearly(values) if values.len() == horizon_years => Ok(values.clone()),
            AnnualSavings::Yearly(values) => Err(FinancialError::HorizonMismatch {
                expected: horizon_years,
                actual: values.len(),
            }),
        }
    }
}

fn discount(flow: f64, rate: f64, year: usize) -> f64 {
    flow / (1.0 + rate).powi(year as i32)
}

/// Net present value of the savings minus the initial investment.
pub fn npv(
    initial_investment: f64,
    savings: &AnnualSavings,
    horizon_years: usize,
    discount_rate: f64,
) -> Result<f64, FinancialError> {
    let flows = savings.cashflows(horizon_years)?;
    let present: f64 = flows
        .iter()
        .enumerate()
        .map(|(i, flow)| discount(*flow, discount_rate, i + 1))
        .sum();
    Ok(present - initial_investment)
}

// Years until cumulative (non-positive flows included) covers the investment,
// interpolated within the recovering year.
fn payback(initial_investment: f64, flows: impl Iterator<Item = f64>) -> Option<f64> {
    let mut cumulative = 0.0;
    for (i, flow) in flows.enumerate() {
        if flow <= 0.0 {
            cumulative += flow;
            continue;
        }
        let previous = cumulative;
        cumulative += flow;
        if cumulative >= initial_investment {
            return Some(i as f64 + (initial_investment - previous) / flow);
        }
    }
    None
}

/// Simple payback in (fractional) years; `None` if not recovered in the horizon.
pub fn payback_simple(
    initial_investment: f64,
    savings: &AnnualSavings,
    horizon_years: usize,
) -> Result<Option<f64>, FinancialError> {
    let flows = savings.cashflows(horizon_years)?;
    Ok(payback(initial_investment, flows.into_iter()))
}

/// Discounted payback in (fractional) years; `None` if not recovered.
pub fn payback_discounted(
    initial_investment: f64,
    savings: &AnnualSavings,
    horizon_years: usize,
    discount_rate: f64,
) -> Result<Option<f64>, FinancialError> {
    let flows = savings.cashflows(horizon_years)?;
    Ok(payback(
        initial_investment,
        flows
            .into_iter()
            .enumerate()
            .map(|(i, flow)| discount(flow, discount_rate, i + 1)),
    ))
}

/// Return on investment over the horizon: `(Σ savings - investment) / investment`.
pub fn roi(
    initial_investment: f64,
    savings: &AnnualSavings,
    horizon_years: usize,
) -> Result<f64, FinancialError> {
    let total: f64 = savings.cashflows(horizon_years)?.iter().sum();
    if initial_investment == 0.0 {
        return Err(FinancialError::ZeroInvestment);
    }
    Ok((total - initial_investment) / initial_investment)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancialIndicators {
    pub npv: f64,
    pub payback_simple: Option<f64>,
    pub payback_discounted: Option<f64>,
    pub roi: f64,
}

pub fn financial_indicators(
    initial_investment: f64,
    savings: &AnnualSavings,
    horizon_years: usize,
    discount_rate: f64,
) -> Result<FinancialIndicators, FinancialError> {
    let indicators = FinancialIndicators {
        npv: npv(initial_investment, savings, horizon_years, discount_rate)?,
        payback_simple: payback_simple(initial_investment, savings, horizon_years)?,
        payback_discounted: payback_discounted(
            initial_investment,
            savings,
            horizon_years,
            discount_rate,
        )?,
        roi: roi(initial_investment, savings, horizon_years)?,
    };
    debug!(?indicators, "financial indicators computed");
    Ok(indicators)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_matrix::CostEdge;

    #[test]
    fn summary_counts_matched_clients() {
        let matrix = CostMatrix::from_edges(vec![
            CostEdge::with_cost("F1", "C1", 10.0),
            CostEdge::with_cost("F1", "C2", 20.0),
        ]);
        let mut allocation = BTreeMap::new();
        allocation.insert(ClientId::new("C1"), FacilityId::new("F1"));
        allocation.insert(ClientId::new("C2"), FacilityId::new("F1"));
        allocation.insert(ClientId::new("C3"), FacilityId::new("F1"));

        let s = compute_financials(&allocation, &matrix, 100.0, 50.0);
        assert_eq!(s.revenue, 200.0);
        assert_eq!(s.variable_cost, 30.0);
        assert_eq!(s.margin, 120.0);
    }

    #[test]
    fn npv_of_constant_savings() {
        let v = npv(100.0, &AnnualSavings::Constant(50.0), 3, 0.1).unwrap();
        let expected = 50.0 / 1.1 + 50.0 / 1.21 + 50.0 / 1.331 - 100.0;
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn simple_payback_interpolates() {
        let p = payback_simple(100.0, &AnnualSavings::Constant(40.0), 5).unwrap();
        assert!((p.unwrap() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn payback_skips_negative_years() {
        let savings = AnnualSavings::Yearly(vec![-20.0, 60.0, 60.0]);
        let p = payback_simple(40.0, &savings, 3).unwrap().unwrap();
        // cumulative: -20, 40 -> recovered at the end of year 2
        assert!((p - 2.0).abs() < 1e-9);
    }

    #[test]
    fn payback_not_reached() {
        assert_eq!(
            payback_discounted(1_000.0, &AnnualSavings::Constant(10.0), 5, 0.12).unwrap(),
            None
        );
    }

    #[test]
    fn roi_requires_investment() {
        assert_eq!(
            roi(0.0, &AnnualSavings::Constant(1.0), 5).unwrap_err(),
            FinancialError::ZeroInvestment
        );
        assert!((roi(100.0, &AnnualSavings::Constant(30.0), 5).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn horizon_mismatch_is_rejected() {
        let err = npv(1.0, &AnnualSavings::Yearly(vec![1.0, 2.0]), 3, 0.1).unwrap_err();
        assert!(matches!(err, FinancialError::HorizonMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn indicators_bundle() {
        let ind = financial_indicators(100.0, &50.0.into(), 5, 0.12).unwrap();
        assert!(ind.npv > 0.0);
        assert!((ind.payback_simple.unwrap() - 2.0).abs() < 1e-9);
        assert!(ind.payback_discounted.unwrap() > 2.0);
        assert!((ind.roi - 1.5).abs() < 1e-12);
    }
}
