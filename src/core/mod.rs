mod chart;
mod engine;
mod format;
mod types;

pub use chart::{
    AxisTick, CHART_TITLE, CONTRIBUTIONS_LABEL, ChartData, ChartPoint, ChartSeries, LineStyle,
    VALUE_LABEL, build_chart, render_svg,
};
pub use engine::{MAX_YEARS, monthly_rate, run_simulation, simulate, yearly_sample};
pub use format::format_dollars;
pub use types::{
    MONTHS_PER_YEAR, MonthlyPoint, MonthlySeries, SimulationError, SimulationInput, YearlyPoint,
};
