use anyhow::{Context, Result};
use popdyn_core::{CompetitionParams, HunterSweepConfig, SisSweepConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters for all three pipelines. Missing sections and fields fall back
/// to the classic coursework values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PopdynConfig {
    pub phase_space: CompetitionParams,
    pub sis: SisSweepConfig,
    pub hunter: HunterSweepConfig,
}

impl PopdynConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::PopdynConfig;
    use popdyn_core::{CompetitionParams, SweepGrid};
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config: PopdynConfig = serde_json::from_str("{}").expect("empty config parses");
        assert_eq!(config, PopdynConfig::default());
        assert_eq!(config.phase_space, CompetitionParams::default());
        assert_eq!(config.sis.steps, 50);
        assert_eq!(config.hunter.steps, 1000);
        assert_eq!(config.hunter.grid.betas, vec![0.002, 0.005, 0.008]);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: PopdynConfig = serde_json::from_str(
            r#"{
                "phase_space": { "k2": 200.0, "alpha1": 1.0, "alpha2": 2.0 },
                "sis": { "grid": { "betas": [0.05], "step_sizes": [0.1, 0.2] } }
            }"#,
        )
        .expect("partial config parses");

        assert_eq!(config.phase_space.k1, 100.0);
        assert_eq!(config.phase_space.k2, 200.0);
        assert_eq!(config.sis.gamma, 0.25);
        assert_eq!(config.sis.grid, SweepGrid::new(vec![0.05], vec![0.1, 0.2]));
        assert_eq!(config.hunter, PopdynConfig::default().hunter);
    }

    #[test]
    fn load_reads_json_file_and_reports_bad_input() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "hunter": {{ "steps": 10 }} }}"#).expect("write config");
        let config = PopdynConfig::load(file.path()).expect("config loads");
        assert_eq!(config.hunter.steps, 10);

        let mut broken = tempfile::NamedTempFile::new().expect("temp file");
        write!(broken, "not json").expect("write config");
        let err = PopdynConfig::load(broken.path()).expect_err("expected parse error");
        assert!(format!("{err}").contains("Failed to parse config file"));

        let missing = file.path().with_extension("missing");
        let err = PopdynConfig::load(&missing).expect_err("expected read error");
        assert!(format!("{err}").contains("Failed to read config file"));
    }
}
