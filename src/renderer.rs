use crate::models::{ComparisonReport, NormalityRecord, PairwiseTestResult};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Table};
use std::fmt;

/// 表格渲染器，把比较报告格式化为终端表格
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    precision: usize,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

impl TableRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED).apply_modifier(UTF8_ROUND_CORNERS);
        table
    }

    fn number(&self, value: f64) -> String {
        if value.is_infinite() {
            return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
        }
        format!("{:.*}", self.precision, value)
    }

    /// 过小的 p 值改用科学计数法，避免显示成 0.0000
    fn p_value(&self, p: f64) -> String {
        if p > 0.0 && p < 10f64.powi(-(self.precision as i32)) {
            format!("{:.2e}", p)
        } else {
            self.number(p)
        }
    }

    fn yes_no(flag: bool) -> &'static str {
        if flag { "yes" } else { "no" }
    }

    pub fn normality_table(&self, records: &[NormalityRecord]) -> Table {
        let mut table = Self::new_table();
        table.set_header(vec!["model", "n", "W", "p-value", "normal?"]);
        for record in records {
            let w = if record.degenerate {
                format!("{} (constant)", self.number(record.statistic))
            } else {
                self.number(record.statistic)
            };
            table.add_row(vec![
                Cell::new(&record.model),
                Cell::new(record.sample_count),
                Cell::new(w),
                Cell::new(self.p_value(record.p_value)),
                Cell::new(Self::yes_no(record.is_normal)),
            ]);
        }
        table
    }

    pub fn pairwise_table(&self, results: &[PairwiseTestResult]) -> Table {
        let mut table = Self::new_table();
        table.set_header(vec![
            "model1",
            "model2",
            "t-test p",
            "t-test significant?",
            "both normal?",
            "wilcoxon p",
            "wilcoxon significant?",
        ]);
        for result in results {
            table.add_row(vec![
                Cell::new(&result.model1),
                Cell::new(&result.model2),
                Cell::new(self.p_value(result.t_p_value)),
                Cell::new(Self::yes_no(result.t_significant)),
                Cell::new(Self::yes_no(result.both_normal)),
                Cell::new(self.p_value(result.wilcoxon_p_value)),
                Cell::new(Self::yes_no(result.wilcoxon_significant)),
            ]);
        }
        table
    }

    pub fn render(&self, report: &ComparisonReport) -> String {
        format!(
            "Normality ({}_{}, threshold {})\n{}\n\nPaired tests\n{}",
            report.split,
            report.metric,
            report.significance_threshold,
            self.normality_table(&report.normality),
            self.pairwise_table(&report.pairwise),
        )
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TableRenderer::default().render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataSplit, HyperparameterSignature};

    fn sample_report() -> ComparisonReport {
        let a = HyperparameterSignature::new().with("lr", 0.01);
        let b = HyperparameterSignature::new().with("lr", 0.1);
        ComparisonReport {
            metric: "accuracy".to_string(),
            split: DataSplit::Validation,
            significance_threshold: 0.01,
            normality: vec![
                NormalityRecord {
                    model: a.clone(),
                    sample_count: 5,
                    statistic: 0.9512,
                    p_value: 0.7432,
                    is_normal: true,
                    degenerate: false,
                },
                NormalityRecord {
                    model: b.clone(),
                    sample_count: 5,
                    statistic: 1.0,
                    p_value: 1.0,
                    is_normal: true,
                    degenerate: true,
                },
            ],
            pairwise: vec![PairwiseTestResult {
                model1: a,
                model2: b,
                t_statistic: 10.3,
                t_p_value: 0.00002,
                t_significant: true,
                both_normal: true,
                wilcoxon_statistic: 0.0,
                wilcoxon_p_value: 0.0625,
                wilcoxon_significant: false,
            }],
        }
    }

    #[test]
    fn test_render_contains_headers_and_models() {
        let output = TableRenderer::new().render(&sample_report());
        for header in ["model", "W", "normal?", "model1", "model2", "t-test p", "both normal?", "wilcoxon p"] {
            assert!(output.contains(header), "missing header {header}");
        }
        assert!(output.contains("lr=0.01"));
        assert!(output.contains("validation_accuracy"));
        assert!(output.contains("(constant)"));
    }

    #[test]
    fn test_p_value_formatting() {
        let renderer = TableRenderer::new();
        assert_eq!(renderer.p_value(0.0625), "0.0625");
        assert_eq!(renderer.p_value(0.00002), "2.00e-5");
        assert_eq!(renderer.p_value(0.0), "0.0000");
        assert_eq!(renderer.with_precision(2).p_value(0.5), "0.50");
        assert_eq!(renderer.number(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_display_matches_default_render() {
        let report = sample_report();
        assert_eq!(report.to_string(), TableRenderer::default().render(&report));
    }

    #[test]
    fn test_empty_pairwise_table() {
        let table = TableRenderer::new().pairwise_table(&[]);
        assert!(table.to_string().contains("wilcoxon significant?"));
    }
}
