use tracing::debug;

use super::types::{
    MONTHS_PER_YEAR, MonthlySeries, SimulationError, SimulationInput, YearlyPoint,
};

pub const MAX_YEARS: u32 = 1_000;

pub fn monthly_rate(annual_return_percent: f64) -> f64 {
    (1.0 + annual_return_percent / 100.0).powf(1.0 / MONTHS_PER_YEAR as f64) - 1.0
}

pub fn run_simulation(input: &SimulationInput) -> Result<MonthlySeries, SimulationError> {
    simulate(
        input.monthly_contribution,
        input.annual_return_percent,
        input.years,
    )
}

pub fn simulate(
    monthly_contribution: f64,
    annual_return_percent: f64,
    years: u32,
) -> Result<MonthlySeries, SimulationError> {
    validate_inputs(monthly_contribution, annual_return_percent, years)?;

    let months = years as usize * MONTHS_PER_YEAR;
    let rate = monthly_rate(annual_return_percent);
    let growth = 1.0 + rate;

    let mut cumulative_contribution = Vec::with_capacity(months);
    let mut cumulative_value = Vec::with_capacity(months);
    let mut balance = 0.0;
    for month in 0..months {
        let contributed = (month + 1) as f64 * monthly_contribution;
        // Without growth the balance is exactly the deposits; summing would drift.
        balance = if growth == 1.0 {
            contributed
        } else {
            (balance + monthly_contribution) * growth
        };
        if !balance.is_finite() {
            return Err(invalid(&format!(
                "inputs overflow double precision by month {}; lower the annual return or years",
                month + 1
            )));
        }
        cumulative_contribution.push(contributed);
        cumulative_value.push(balance);
    }

    debug!(
        monthly_contribution,
        annual_return_percent,
        years,
        monthly_rate = rate,
        final_value = balance,
        "simulated compounding series"
    );

    Ok(MonthlySeries {
        monthly_rate: rate,
        cumulative_contribution,
        cumulative_value,
    })
}

pub fn yearly_sample(series: &MonthlySeries) -> Vec<YearlyPoint> {
    series
        .cumulative_contribution
        .iter()
        .zip(&series.cumulative_value)
        .skip(MONTHS_PER_YEAR - 1)
        .step_by(MONTHS_PER_YEAR)
        .enumerate()
        .map(|(idx, (&contribution, &value))| YearlyPoint {
            year: idx as u32 + 1,
            contribution,
            value,
        })
        .collect()
}

fn validate_inputs(
    monthly_contribution: f64,
    annual_return_percent: f64,
    years: u32,
) -> Result<(), SimulationError> {
    if !monthly_contribution.is_finite() {
        return Err(invalid("monthly contribution must be a finite number"));
    }
    if monthly_contribution < 0.0 {
        return Err(invalid("monthly contribution must be >= 0"));
    }
    if !annual_return_percent.is_finite() {
        return Err(invalid("annual return must be a finite number"));
    }
    if annual_return_percent < -100.0 {
        return Err(invalid("annual return must be >= -100%"));
    }
    if years == 0 {
        return Err(invalid("years must be >= 1"));
    }
    if years > MAX_YEARS {
        return Err(invalid(&format!("years must be <= {MAX_YEARS}")));
    }
    Ok(())
}

fn invalid(msg: &str) -> SimulationError {
    SimulationError::InvalidInput(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn expect_invalid(result: Result<MonthlySeries, SimulationError>) -> String {
        match result.expect_err("must reject input") {
            SimulationError::InvalidInput(msg) => msg,
        }
    }

    #[test]
    fn monthly_rate_uses_geometric_root_of_annual_return() {
        assert_approx(monthly_rate(7.0), 0.005654);
        assert!(monthly_rate(7.0) < 7.0 / 100.0 / 12.0);
        assert_approx((1.0 + monthly_rate(7.0)).powi(12), 1.07);
        assert_eq!(monthly_rate(0.0), 0.0);
        assert_approx(monthly_rate(-100.0), -1.0);
    }

    #[test]
    fn one_year_at_seven_percent_grows_between_bounds() {
        let series = simulate(500.0, 7.0, 1).expect("valid inputs");
        assert_eq!(series.len(), 12);
        assert_eq!(series.cumulative_contribution[11], 6_000.0);

        let value = series.cumulative_value[11];
        assert!(value > 6_000.0, "expected growth, got {value}");
        assert!(value < 500.0 * 12.0 * 1.07, "value {value} above upper bound");
        assert_approx_tol(value, 6_225.148_572_755_7, 1e-6);
    }

    #[test]
    fn first_month_compounds_the_first_deposit() {
        let series = simulate(500.0, 7.0, 1).expect("valid inputs");
        assert_approx(series.cumulative_value[0], 500.0 * (1.0 + series.monthly_rate));
    }

    #[test]
    fn rejects_zero_years() {
        let msg = expect_invalid(simulate(500.0, 7.0, 0));
        assert!(msg.contains("years"));
    }

    #[test]
    fn rejects_negative_contribution() {
        let msg = expect_invalid(simulate(-100.0, 7.0, 5));
        assert!(msg.contains("monthly contribution"));
    }

    #[test]
    fn rejects_return_below_minus_one_hundred_percent() {
        let msg = expect_invalid(simulate(500.0, -101.0, 5));
        assert!(msg.contains("annual return"));
    }

    #[test]
    fn rejects_non_finite_inputs() {
        expect_invalid(simulate(f64::NAN, 7.0, 5));
        expect_invalid(simulate(500.0, f64::INFINITY, 5));
        expect_invalid(simulate(f64::INFINITY, 7.0, 5));
    }

    #[test]
    fn rejects_horizons_beyond_max_years() {
        expect_invalid(simulate(500.0, 7.0, MAX_YEARS + 1));
        assert_eq!(
            simulate(1.0, 7.0, MAX_YEARS).expect("valid inputs").years(),
            MAX_YEARS as usize
        );
    }

    #[test]
    fn rejects_inputs_that_overflow() {
        let msg = expect_invalid(simulate(500.0, 200.0, MAX_YEARS));
        assert!(msg.contains("overflow"));
        assert!(simulate(5_000.0, 20.0, 40).is_ok());
    }

    #[test]
    fn total_loss_wipes_out_each_deposit() {
        let series = simulate(500.0, -100.0, 2).expect("valid inputs");
        assert!(series.cumulative_value.iter().all(|v| v.abs() <= EPS));
        assert_eq!(series.cumulative_contribution[23], 12_000.0);
    }

    #[test]
    fn negative_return_keeps_value_below_contributions() {
        let series = simulate(500.0, -10.0, 3).expect("valid inputs");
        for (c, v) in series
            .cumulative_contribution
            .iter()
            .zip(&series.cumulative_value)
        {
            assert!(v < c, "value {v} should trail contribution {c}");
        }
    }

    #[test]
    fn fractional_contribution_without_return_tracks_deposits_exactly() {
        let series = simulate(0.1, 0.0, 40).expect("valid inputs");
        assert_eq!(series.cumulative_value, series.cumulative_contribution);
    }

    #[test]
    fn run_simulation_matches_scalar_entry_point() {
        let input = SimulationInput {
            monthly_contribution: 250.0,
            annual_return_percent: 5.5,
            years: 4,
        };
        assert_eq!(
            run_simulation(&input).expect("valid inputs"),
            simulate(250.0, 5.5, 4).expect("valid inputs")
        );
    }

    #[test]
    fn yearly_sample_takes_year_end_months() {
        let series = simulate(500.0, 7.0, 3).expect("valid inputs");
        let yearly = yearly_sample(&series);
        let years: Vec<u32> = yearly.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1, 2, 3]);
        assert_eq!(yearly[2].contribution, 18_000.0);
        assert_approx_tol(yearly[1].value, 12_886.057_545_604_3, 1e-6);
        assert_approx_tol(yearly[2].value, 20_013.230_146_552_3, 1e-6);
    }

    #[test]
    fn yearly_sample_of_empty_series_is_empty() {
        let series = MonthlySeries {
            monthly_rate: 0.0,
            cumulative_contribution: Vec::new(),
            cumulative_value: Vec::new(),
        };
        assert!(yearly_sample(&series).is_empty());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_series_shape_and_contributions_are_exact(
            contribution in 0u32..5_001,
            return_halves in -200i32..201,
            years in 1u32..41
        ) {
            let contribution = contribution as f64;
            let series = simulate(contribution, return_halves as f64 / 2.0, years)
                .expect("valid inputs");

            prop_assert_eq!(series.len(), years as usize * 12);
            prop_assert_eq!(series.cumulative_contribution.len(), series.cumulative_value.len());
            for (i, c) in series.cumulative_contribution.iter().enumerate() {
                prop_assert_eq!(*c, (i + 1) as f64 * contribution);
            }
            prop_assert!(series.cumulative_value.iter().all(|v| v.is_finite()));
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_non_negative_return_never_loses_money_and_is_monotonic(
            contribution in 0u32..5_001,
            return_halves in 0u32..41,
            years in 1u32..41
        ) {
            let series = simulate(contribution as f64, return_halves as f64 / 2.0, years)
                .expect("valid inputs");

            for (c, v) in series.cumulative_contribution.iter().zip(&series.cumulative_value) {
                prop_assert!(v >= c, "value {} below contribution {}", v, c);
            }
            for pair in series.cumulative_value.windows(2) {
                prop_assert!(pair[1] >= pair[0]);
            }
            for pair in series.cumulative_contribution.windows(2) {
                prop_assert!(pair[1] >= pair[0]);
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_zero_contribution_stays_at_zero(
            return_halves in -200i32..201,
            years in 1u32..41
        ) {
            let series = simulate(0.0, return_halves as f64 / 2.0, years).expect("valid inputs");
            prop_assert!(series.cumulative_value.iter().all(|v| *v == 0.0));
        }

        #[test]
        fn prop_zero_return_matches_contributions(
            contribution in 0u32..5_001,
            years in 1u32..41
        ) {
            let series = simulate(contribution as f64, 0.0, years).expect("valid inputs");
            prop_assert_eq!(&series.cumulative_value, &series.cumulative_contribution);
        }

        #[test]
        fn prop_yearly_sample_aligns_with_monthly_series(
            contribution in 0u32..5_001,
            return_halves in 0u32..41,
            years in 1u32..41
        ) {
            let series = simulate(contribution as f64, return_halves as f64 / 2.0, years)
                .expect("valid inputs");
            let yearly = yearly_sample(&series);

            prop_assert_eq!(yearly.len(), years as usize);
            for (k, point) in yearly.iter().enumerate() {
                let idx = (k + 1) * 12 - 1;
                prop_assert_eq!(point.year, k as u32 + 1);
                prop_assert_eq!(point.contribution, series.cumulative_contribution[idx]);
                prop_assert_eq!(point.value, series.cumulative_value[idx]);
            }
        }
    }
}
