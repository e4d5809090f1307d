use crate::error::LrError;
use crate::links::percentiles::PercentileConfig;
use crate::links::transducer::SampleCaps;
use crate::pagerank::rank::{PageRankConfig, Termination};
use crate::streams::partition::{PartitionLayout, FIRST_PART_ID_SIZE, PART_ID_SIZE};
use crate::util::io::get_buf_reader;
use std::path::Path;

/// Run settings. Every field has a default, so a settings file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub first_part_size: u32,
    pub part_size: u32,
    pub max_links_sample: usize,
    pub max_error_links_sample: usize,
    pub nb_quantiles: u32,
    pub include_redirects_in_inlinks: bool,
    pub damping: f64,
    pub termination: Termination,
    pub nb_top_domains: usize,
    pub force_fetch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            first_part_size: FIRST_PART_ID_SIZE,
            part_size: PART_ID_SIZE,
            max_links_sample: 300,
            max_error_links_sample: 10,
            nb_quantiles: 100,
            include_redirects_in_inlinks: true,
            damping: 0.85,
            termination: Termination::default(),
            nb_top_domains: 100,
            force_fetch: false,
        }
    }
}

impl Settings {
    pub fn from_json_file(file_path: &Path) -> Result<Self, LrError> {
        let settings: Settings = serde_json::from_reader(get_buf_reader(file_path)?)
            .map_err(|e| LrError::Config(format!("'{}': {}", file_path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), LrError> {
        if self.first_part_size == 0 || self.part_size == 0 {
            return Err(LrError::Config("Partition sizes must be positive".to_owned()));
        }
        if self.nb_quantiles == 0 {
            return Err(LrError::Config("The number of quantiles must be positive".to_owned()));
        }
        if !(0_f64..=1_f64).contains(&self.damping) {
            return Err(LrError::Config(format!("Damping {} is not in [0, 1]", self.damping)));
        }
        Ok(())
    }

    pub fn layout(&self) -> PartitionLayout {
        PartitionLayout::new(self.first_part_size, self.part_size)
    }

    pub fn caps(&self) -> SampleCaps {
        SampleCaps::new(self.max_links_sample, self.max_error_links_sample)
    }

    pub fn percentiles(&self) -> PercentileConfig {
        PercentileConfig::new(self.nb_quantiles, self.include_redirects_in_inlinks)
    }

    pub fn pagerank(&self) -> PageRankConfig {
        PageRankConfig::new(self.damping, self.termination)
    }
}
