use crate::errors::ConfigError;
use crate::overlaps::decode_evalue;
use crate::best_edge::MAX_EVALUE;

/// Construction parameters of a best overlap graph.
#[derive(Clone, Debug)]
pub struct GraphConfig {
    /// Global maximum error rate (fraction) for graph edges.
    pub erate_graph: f64,
    /// Multiplier on the MAD-derived sigma when `filter_high_error` is set.
    pub deviation_graph: f64,
    /// Minimum overlap length as a fraction of the shorter read.
    pub min_olap_fraction: f64,

    pub filter_coverage_gap: bool,
    /// Bases two overlaps must share to count as continuous coverage.
    pub cov_gap_olap: u32,

    pub filter_high_error: bool,

    pub filter_lopsided: bool,
    /// Percent difference between the two best overlap lengths of a read.
    pub lopsided_diff: f64,

    pub filter_spur: bool,
    /// Dead-end walks at most this many reads long end in a spur.
    pub spur_depth: u32,

    /// Report file prefix. No reports are written without one.
    pub prefix: Option<String>,
    /// Distinguishes reports of several graphs built in one run.
    pub label: String,
    pub emit_good_overlaps: bool,
    /// Also write the best edges as `<prefix>.<label>.dot`.
    pub emit_dot: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            erate_graph: 0.075,
            deviation_graph: 6.0,
            min_olap_fraction: 0.0,
            filter_coverage_gap: true,
            cov_gap_olap: 500,
            filter_high_error: true,
            filter_lopsided: true,
            lopsided_diff: 25.0,
            filter_spur: true,
            spur_depth: 3,
            prefix: None,
            label: "best".to_string(),
            emit_good_overlaps: false,
            emit_dot: false,
        }
    }
}

impl GraphConfig {
    /// Refuse to start on parameters the graph cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_edge_packing()?;

        if !(0.0..=decode_evalue(MAX_EVALUE)).contains(&self.erate_graph) {
            return Err(ConfigError::ErrorRate(self.erate_graph));
        }
        if !(self.deviation_graph >= 0.0) {
            return Err(ConfigError::Deviation(self.deviation_graph));
        }
        if !(0.0..=1.0).contains(&self.min_olap_fraction) {
            return Err(ConfigError::MinOverlapFraction(self.min_olap_fraction));
        }
        if !(self.lopsided_diff >= 0.0) {
            return Err(ConfigError::LopsidedDiff(self.lopsided_diff));
        }
        Ok(())
    }

    /// Configuration for the second, bubble-aware graph of a run.
    pub fn for_label(&self, label: &str) -> Self {
        Self { label: label.to_string(), ..self.clone() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PathSeedConfig {
    /// When set, the seed ordering is written to `<prefix>.seeds`.
    pub prefix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GraphConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let bad = GraphConfig { erate_graph: 0.5, ..GraphConfig::default() };
        assert_eq!(bad.validate(), Err(ConfigError::ErrorRate(0.5)));

        let bad = GraphConfig { deviation_graph: -1.0, ..GraphConfig::default() };
        assert_eq!(bad.validate(), Err(ConfigError::Deviation(-1.0)));

        let bad = GraphConfig { min_olap_fraction: 1.5, ..GraphConfig::default() };
        assert_eq!(bad.validate(), Err(ConfigError::MinOverlapFraction(1.5)));

        let bad = GraphConfig { lopsided_diff: f64::NAN, ..GraphConfig::default() };
        assert!(matches!(bad.validate(), Err(ConfigError::LopsidedDiff(_))));
    }

    #[test]
    fn relabelled_config_keeps_parameters() {
        let c = GraphConfig { spur_depth: 9, ..GraphConfig::default() }.for_label("bubble-free");
        assert_eq!(c.label, "bubble-free");
        assert_eq!(c.spur_depth, 9);
    }
}
