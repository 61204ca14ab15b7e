use serde::Serialize;

use super::format::format_dollars;
use super::types::{SimulationInput, YearlyPoint};

pub const CHART_TITLE: &str = "Investment Growth Over Time";
pub const CONTRIBUTIONS_LABEL: &str = "Total Contributions";
pub const VALUE_LABEL: &str = "Cumulative Value";

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TARGET_Y_TICKS: usize = 6;
const MAX_X_LABELS: u32 = 10;
const EMPTY_Y_MAX: f64 = 1_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: u32,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: &'static str,
    pub color: &'static str,
    pub style: LineStyle,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisTick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: &'static str,
    pub subtitle: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub years: u32,
    pub y_max: f64,
    pub y_ticks: Vec<AxisTick>,
    pub series: Vec<ChartSeries>,
}

pub fn build_chart(input: &SimulationInput, yearly: &[YearlyPoint]) -> ChartData {
    let contributions = yearly
        .iter()
        .map(|p| ChartPoint {
            x: p.year,
            y: p.contribution,
        })
        .collect();
    let values = yearly
        .iter()
        .map(|p| ChartPoint {
            x: p.year,
            y: p.value,
        })
        .collect();

    let data_max = yearly
        .iter()
        .flat_map(|p| [p.contribution, p.value])
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_ticks = y_axis_ticks(data_max);
    let y_max = y_ticks.last().map_or(EMPTY_Y_MAX, |t| t.value);

    ChartData {
        title: CHART_TITLE,
        subtitle: format!(
            "{} per month at {}% for {} {}",
            format_dollars(input.monthly_contribution),
            input.annual_return_percent,
            input.years,
            if input.years == 1 { "year" } else { "years" }
        ),
        x_label: "Years",
        y_label: "Dollars",
        years: yearly.len() as u32,
        y_max,
        y_ticks,
        series: vec![
            ChartSeries {
                label: CONTRIBUTIONS_LABEL,
                color: "blue",
                style: LineStyle::Dashed,
                points: contributions,
            },
            ChartSeries {
                label: VALUE_LABEL,
                color: "green",
                style: LineStyle::Solid,
                points: values,
            },
        ],
    }
}

fn nice_step(max: f64, target_ticks: usize) -> f64 {
    let raw = max / target_ticks as f64;
    let magnitude = 10_f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn y_axis_ticks(data_max: f64) -> Vec<AxisTick> {
    let max = if data_max > 0.0 { data_max } else { EMPTY_Y_MAX };
    let step = nice_step(max, TARGET_Y_TICKS);
    let count = (max / step).ceil().max(1.0) as usize;
    (0..=count)
        .map(|i| {
            let value = i as f64 * step;
            AxisTick {
                value,
                label: format_dollars(value),
            }
        })
        .collect()
}

struct Plot {
    years: u32,
    y_max: f64,
}

impl Plot {
    fn left(&self) -> f64 {
        MARGIN_LEFT
    }

    fn right(&self) -> f64 {
        WIDTH - MARGIN_RIGHT
    }

    fn top(&self) -> f64 {
        MARGIN_TOP
    }

    fn bottom(&self) -> f64 {
        HEIGHT - MARGIN_BOTTOM
    }

    fn x(&self, year: u32) -> f64 {
        let width = self.right() - self.left();
        if self.years <= 1 {
            return self.left() + width / 2.0;
        }
        self.left() + (year.saturating_sub(1)) as f64 / (self.years - 1) as f64 * width
    }

    fn y(&self, value: f64) -> f64 {
        let height = self.bottom() - self.top();
        let clamped = value.clamp(0.0, self.y_max);
        self.bottom() - clamped / self.y_max * height
    }
}

pub fn render_svg(chart: &ChartData) -> String {
    let plot = Plot {
        years: chart.years,
        y_max: if chart.y_max > 0.0 {
            chart.y_max
        } else {
            EMPTY_Y_MAX
        },
    };
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{WIDTH}\" height=\"{HEIGHT}\" \
         viewBox=\"0 0 {WIDTH} {HEIGHT}\" font-family=\"sans-serif\" font-size=\"12\">\n"
    ));
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"26\" text-anchor=\"middle\" font-size=\"18\">{}</text>\n",
        WIDTH / 2.0,
        escape_xml(chart.title)
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"46\" text-anchor=\"middle\" fill=\"#555\">{}</text>\n",
        WIDTH / 2.0,
        escape_xml(&chart.subtitle)
    ));

    for tick in &chart.y_ticks {
        let y = plot.y(tick.value);
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#ddd\"/>\n",
            plot.left(),
            plot.right()
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>\n",
            plot.left() - 8.0,
            y + 4.0,
            escape_xml(&tick.label)
        ));
    }

    let label_every = chart.years.div_ceil(MAX_X_LABELS).max(1);
    for year in (1..=chart.years).filter(|y| (y - 1) % label_every == 0) {
        let x = plot.x(year);
        svg.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#ddd\"/>\n",
            plot.top(),
            plot.bottom()
        ));
        svg.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{year}</text>\n",
            plot.bottom() + 18.0
        ));
    }

    svg.push_str(&format!(
        "<line x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" stroke=\"#333\"/>\n\
         <line x1=\"{l:.1}\" y1=\"{t:.1}\" x2=\"{l:.1}\" y2=\"{b:.1}\" stroke=\"#333\"/>\n",
        l = plot.left(),
        r = plot.right(),
        t = plot.top(),
        b = plot.bottom()
    ));
    svg.push_str(&format!(
        "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>\n",
        (plot.left() + plot.right()) / 2.0,
        HEIGHT - 16.0,
        escape_xml(chart.x_label)
    ));
    svg.push_str(&format!(
        "<text x=\"20\" y=\"{mid:.1}\" text-anchor=\"middle\" transform=\"rotate(-90 20 {mid:.1})\">{}</text>\n",
        escape_xml(chart.y_label),
        mid = (plot.top() + plot.bottom()) / 2.0
    ));

    for series in &chart.series {
        let points = series
            .points
            .iter()
            .map(|p| format!("{:.1},{:.1}", plot.x(p.x), plot.y(p.y)))
            .collect::<Vec<_>>()
            .join(" ");
        let dash = match series.style {
            LineStyle::Solid => "",
            LineStyle::Dashed => " stroke-dasharray=\"6 4\"",
        };
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\"{dash} points=\"{points}\"/>\n",
            series.color
        ));
        for p in &series.points {
            svg.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"2.5\" fill=\"{}\"/>\n",
                plot.x(p.x),
                plot.y(p.y),
                series.color
            ));
        }
    }

    for (idx, series) in chart.series.iter().enumerate() {
        let y = plot.top() + 16.0 + idx as f64 * 18.0;
        let x = plot.left() + 16.0;
        let dash = match series.style {
            LineStyle::Solid => "",
            LineStyle::Dashed => " stroke-dasharray=\"6 4\"",
        };
        svg.push_str(&format!(
            "<line x1=\"{x:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{}\" stroke-width=\"2\"{dash}/>\n",
            x + 28.0,
            series.color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\">{}</text>\n",
            x + 36.0,
            y + 4.0,
            escape_xml(series.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
