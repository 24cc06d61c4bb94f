use std::collections::BTreeMap;
use std::path::Path;
use plotters::prelude::*;
use crate::error::{ComparisonError, Result};
use crate::models::{HyperparameterSignature, PlotConfig, RunGroup};
use crate::stats::{gaussian_kde, histogram, scott_bandwidth, sturges_bins};

/// 密度曲线在样本范围两侧延伸的带宽倍数
const KDE_TAIL_BANDWIDTHS: f64 = 3.0;

/// 单个模型组的分布数据，所有组共用同一组箱边界
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSeries {
    pub key: HyperparameterSignature,
    pub samples: Vec<f64>,
    /// bins + 1 个边界
    pub bin_edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// 按计数缩放的密度曲线（密度 × n × 箱宽），两端各延伸 3 个带宽；方差为零时为 None
    pub density: Option<Vec<(f64, f64)>>,
}

/// 所有样本的公共取值范围，极差为零时向两侧扩展
fn sample_range<'a>(groups: impl Iterator<Item = &'a RunGroup>) -> Option<(f64, f64)> {
    let (lo, hi) = groups
        .flat_map(|g| g.samples.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if lo > hi {
        return None;
    }
    if hi - lo > 0.0 {
        Some((lo, hi))
    } else {
        let pad = if lo == 0.0 { 0.5 } else { lo.abs() * 0.05 };
        Some((lo - pad, hi + pad))
    }
}

pub fn build_distributions(
    groups: &BTreeMap<HyperparameterSignature, RunGroup>,
    config: &PlotConfig,
) -> Vec<DistributionSeries> {
    let Some((lo, hi)) = sample_range(groups.values()) else {
        return Vec::new();
    };
    let total: usize = groups.values().map(RunGroup::len).sum();
    let bins = config.bins.unwrap_or_else(|| sturges_bins(total)).max(1);
    let width = (hi - lo) / bins as f64;
    let bin_edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    groups
        .values()
        .map(|group| {
            let counts = histogram(&group.samples, lo, hi, bins);
            let scale = group.len() as f64 * width;
            let density = scott_bandwidth(&group.samples).and_then(|bandwidth| {
                let tail = KDE_TAIL_BANDWIDTHS * bandwidth;
                gaussian_kde(&group.samples, lo - tail, hi + tail, config.kde_points)
                    .map(|curve| curve.into_iter().map(|(x, y)| (x, y * scale)).collect())
            });
            DistributionSeries {
                key: group.key.clone(),
                samples: group.samples.clone(),
                bin_edges: bin_edges.clone(),
                counts,
                density,
            }
        })
        .collect()
}

fn plot_err<E: std::fmt::Display>(err: E) -> ComparisonError {
    ComparisonError::Plot(err.to_string())
}

/// 绘制叠加的直方图与密度曲线，图例为组签名
pub fn render_distributions(
    series: &[DistributionSeries],
    title: &str,
    out_path: &Path,
    config: &PlotConfig,
) -> Result<()> {
    let (Some(first), Some(last)) = (
        series.first().and_then(|s| s.bin_edges.first()),
        series.first().and_then(|s| s.bin_edges.last()),
    ) else {
        return Err(ComparisonError::Plot("no groups to plot".to_string()));
    };
    // x 轴同时覆盖直方图和延伸后的密度曲线
    let (x_lo, x_hi) = series
        .iter()
        .flat_map(|s| s.density.iter().flatten().map(|(x, _)| *x))
        .fold((*first, *last), |(lo, hi), x| (lo.min(x), hi.max(x)));

    let y_max = series
        .iter()
        .flat_map(|s| {
            let bars = s.counts.iter().map(|&c| c as f64);
            let curve = s.density.iter().flatten().map(|(_, y)| *y);
            bars.chain(curve)
        })
        .fold(1.0f64, f64::max)
        * 1.1;

    let root = SVGBackend::new(out_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, 0.0..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(title)
        .y_desc("count")
        .draw()
        .map_err(plot_err)?;

    for (idx, s) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(s.counts.iter().enumerate().map(|(i, &count)| {
                Rectangle::new(
                    [(s.bin_edges[i], 0.0), (s.bin_edges[i + 1], count as f64)],
                    color.mix(0.3).filled(),
                )
            }))
            .map_err(plot_err)?
            .label(s.key.to_string())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.mix(0.6).filled()));

        if let Some(curve) = &s.density {
            chart
                .draw_series(LineSeries::new(curve.iter().copied(), color.stroke_width(2)))
                .map_err(plot_err)?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    tracing::info!(path = %out_path.display(), groups = series.len(), "wrote distribution plot");
    Ok(())
}
