//! SVG box plot of population percentages, responders vs non-responders.
//!
//! Boxes span the interquartile range with a median line; whiskers reach
//! the most extreme observation within 1.5 IQR of the box and anything
//! beyond is drawn as an outlier. Populations whose test is significant
//! are marked with a red `*`.

use std::io::Write;

use cyto_core::{
  analysis::{Comparison, PlotPoint},
  cohort::CohortFilter,
  population::Population,
  subject::ResponseGroup,
};

// ─── Layout ──────────────────────────────────────────────────────────────────

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 560.0;
const LEFT: f64 = 80.0;
const RIGHT: f64 = 180.0;
const TOP: f64 = 90.0;
const BOTTOM: f64 = 80.0;
const Y_TICKS: u32 = 5;

const GROUPS: [(ResponseGroup, &str); 2] = [
  (ResponseGroup::Responder, "#4c72b0"),
  (ResponseGroup::NonResponder, "#dd8452"),
];

// ─── Box statistics ──────────────────────────────────────────────────────────

/// Five-number summary plus outliers for one box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
  pub q1:           f64,
  pub median:       f64,
  pub q3:           f64,
  pub whisker_low:  f64,
  pub whisker_high: f64,
  pub outliers:     Vec<f64>,
}

impl BoxStats {
  /// `None` when there are no finite values.
  pub fn from_values(values: &[f64]) -> Option<Self> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
      return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let reach = 1.5 * (q3 - q1);
    let (lo_fence, hi_fence) = (q1 - reach, q3 + reach);

    let inside = || sorted.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
    Some(Self {
      q1,
      median,
      q3,
      whisker_low: inside().fold(f64::INFINITY, f64::min),
      whisker_high: inside().fold(f64::NEG_INFINITY, f64::max),
      outliers: sorted
        .iter()
        .copied()
        .filter(|v| !(lo_fence..=hi_fence).contains(v))
        .collect(),
    })
  }
}

/// Linearly interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
  let pos = q * (sorted.len() - 1) as f64;
  let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
  sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ─── Rendering ───────────────────────────────────────────────────────────────

fn escape(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

/// Round the largest percentage up to the next multiple of ten.
fn axis_max(points: &[PlotPoint]) -> f64 {
  let max = points.iter().map(|p| p.percentage).fold(0.0, f64::max);
  ((max / 10.0).ceil() * 10.0).max(10.0)
}

fn group_values(points: &[PlotPoint], population: Population, group: ResponseGroup) -> Vec<f64> {
  points
    .iter()
    .filter(|p| p.population == population && p.response == group)
    .map(|p| p.percentage)
    .collect()
}

/// Write the comparison box plot as a standalone SVG document.
pub fn write_boxplot<W: Write>(
  out: &mut W,
  comparison: &Comparison,
  cohort: &CohortFilter,
) -> std::io::Result<()> {
  writeln!(
    out,
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"##
  )?;
  writeln!(out, r##"<rect width="100%" height="100%" fill="white"/>"##)?;
  writeln!(
    out,
    r##"<text x="{}" y="32" text-anchor="middle" font-size="18">Cell Population Frequencies: Responders vs Non-Responders</text>"##,
    WIDTH / 2.0
  )?;
  writeln!(
    out,
    r##"<text x="{}" y="56" text-anchor="middle" font-size="14">({} samples)</text>"##,
    WIDTH / 2.0,
    escape(&cohort.describe())
  )?;

  if comparison.statistics.is_empty() {
    writeln!(
      out,
      r##"<text x="{}" y="{}" text-anchor="middle" font-size="14" fill="#666">No comparable samples in this cohort</text>"##,
      WIDTH / 2.0,
      HEIGHT / 2.0
    )?;
    return writeln!(out, "</svg>");
  }

  let plot_w = WIDTH - LEFT - RIGHT;
  let plot_h = HEIGHT - TOP - BOTTOM;
  let y_max = axis_max(&comparison.plot_points);
  let y = |v: f64| TOP + plot_h * (1.0 - v / y_max);

  // Grid and y ticks.
  for i in 0..=Y_TICKS {
    let v = y_max * f64::from(i) / f64::from(Y_TICKS);
    writeln!(
      out,
      r##"<line x1="{LEFT}" y1="{py:.1}" x2="{x2:.1}" y2="{py:.1}" stroke="#e0e0e0"/><text x="{tx:.1}" y="{ty:.1}" text-anchor="end" font-size="12">{v}</text>"##,
      py = y(v),
      x2 = LEFT + plot_w,
      tx = LEFT - 8.0,
      ty = y(v) + 4.0,
    )?;
  }
  writeln!(
    out,
    r##"<line x1="{LEFT}" y1="{TOP}" x2="{LEFT}" y2="{b:.1}" stroke="black"/><line x1="{LEFT}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="black"/>"##,
    b = TOP + plot_h,
    r = LEFT + plot_w,
  )?;

  let slot = plot_w / comparison.statistics.len() as f64;
  let box_w = slot * 0.3;

  for (i, stat) in comparison.statistics.iter().enumerate() {
    let center = LEFT + slot * (i as f64 + 0.5);

    for (j, (group, color)) in GROUPS.iter().enumerate() {
      let values = group_values(&comparison.plot_points, stat.population, *group);
      let Some(b) = BoxStats::from_values(&values) else {
        continue;
      };
      let cx = center + (j as f64 - 0.5) * box_w * 1.2;
      let (left, right) = (cx - box_w / 2.0, cx + box_w / 2.0);

      writeln!(
        out,
        r##"<line x1="{cx:.1}" y1="{lo:.1}" x2="{cx:.1}" y2="{hi:.1}" stroke="#333"/>"##,
        lo = y(b.whisker_low),
        hi = y(b.whisker_high),
      )?;
      for cap in [b.whisker_low, b.whisker_high] {
        writeln!(
          out,
          r##"<line x1="{x1:.1}" y1="{py:.1}" x2="{x2:.1}" y2="{py:.1}" stroke="#333"/>"##,
          x1 = cx - box_w / 4.0,
          x2 = cx + box_w / 4.0,
          py = y(cap),
        )?;
      }
      writeln!(
        out,
        r##"<rect x="{left:.1}" y="{top:.1}" width="{box_w:.1}" height="{h:.1}" fill="{color}" stroke="#333"/>"##,
        top = y(b.q3),
        h = (y(b.q1) - y(b.q3)).max(1.0),
      )?;
      writeln!(
        out,
        r##"<line x1="{left:.1}" y1="{m:.1}" x2="{right:.1}" y2="{m:.1}" stroke="#333" stroke-width="2"/>"##,
        m = y(b.median),
      )?;
      for o in &b.outliers {
        writeln!(
          out,
          r##"<circle cx="{cx:.1}" cy="{cy:.1}" r="3" fill="none" stroke="#333"/>"##,
          cy = y(*o),
        )?;
      }
    }

    if stat.significant {
      writeln!(
        out,
        r##"<text x="{center:.1}" y="{sy:.1}" text-anchor="middle" font-size="22" fill="red">*</text>"##,
        sy = TOP - 6.0,
      )?;
    }
    writeln!(
      out,
      r##"<text x="{center:.1}" y="{ly:.1}" text-anchor="middle" font-size="12">{}</text>"##,
      escape(stat.population.display_name()),
      ly = TOP + plot_h + 20.0,
    )?;
  }

  // Axis titles.
  writeln!(
    out,
    r##"<text x="{x:.1}" y="{ly:.1}" text-anchor="middle" font-size="14">Cell Population</text>"##,
    x = LEFT + plot_w / 2.0,
    ly = HEIGHT - 24.0,
  )?;
  writeln!(
    out,
    r##"<text transform="translate(24 {my:.1}) rotate(-90)" text-anchor="middle" font-size="14">Percentage (%)</text>"##,
    my = TOP + plot_h / 2.0,
  )?;

  // Legend.
  let lx = LEFT + plot_w + 24.0;
  for (j, (group, color)) in GROUPS.iter().enumerate() {
    let ly = TOP + 20.0 + 24.0 * j as f64;
    writeln!(
      out,
      r##"<rect x="{lx:.1}" y="{ry:.1}" width="14" height="14" fill="{color}" stroke="#333"/><text x="{tx:.1}" y="{ty:.1}" font-size="12">{}</text>"##,
      group.label(),
      ry = ly - 11.0,
      tx = lx + 20.0,
      ty = ly,
    )?;
  }

  writeln!(out, "</svg>")
}
