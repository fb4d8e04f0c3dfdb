//! Build configuration: `crosswalk.toml` merged with command-line flags.
//!
//! Flags win over file values, file values win over defaults. Relative
//! paths in the file are taken relative to the file's directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use xwalk_ingest::UsageLayout;
use xwalk_model::{AllocationPolicy, CrosswalkOptions, MatchingOptions, SimilarityScorer};

/// Output directory when neither the file nor the flags name one.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsSection {
    pub usage: Option<PathBuf>,
    pub onet_dir: Option<PathBuf>,
    pub wages: Option<PathBuf>,
    pub task_ratings: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingSection {
    pub threshold: Option<f64>,
    pub scorer: Option<SimilarityScorer>,
    pub parallel: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationSection {
    pub policy: Option<AllocationPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: Option<PathBuf>,
}

/// Contents of `crosswalk.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub inputs: InputsSection,
    pub matching: MatchingSection,
    pub allocation: AllocationSection,
    pub usage: UsageLayout,
    pub output: OutputSection,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse crosswalk config")
    }

    /// Reads `path` and rebases its relative paths onto the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config =
            Self::parse(&content).with_context(|| format!("in {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        tracing::info!(path = %path.display(), "loaded crosswalk config");
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        let join = |slot: &mut Option<PathBuf>| {
            if let Some(path) = slot.as_mut()
                && path.is_relative()
            {
                *path = base.join(&*path);
            }
        };
        join(&mut self.inputs.usage);
        join(&mut self.inputs.onet_dir);
        join(&mut self.inputs.wages);
        join(&mut self.inputs.task_ratings);
        join(&mut self.output.dir);
    }
}

/// Values given on the command line; `None` defers to the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOverrides {
    pub usage: Option<PathBuf>,
    pub onet_dir: Option<PathBuf>,
    pub wages: Option<PathBuf>,
    pub task_ratings: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub scorer: Option<SimilarityScorer>,
    pub allocation: Option<AllocationPolicy>,
    pub no_parallel: bool,
    pub dry_run: bool,
}

/// Fully resolved settings for one build; echoed into the audit report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSettings {
    pub usage: PathBuf,
    pub onet_dir: PathBuf,
    pub wages: PathBuf,
    pub task_ratings: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub options: CrosswalkOptions,
    pub usage_layout: UsageLayout,
    pub dry_run: bool,
}

impl BuildSettings {
    /// Settings with default options for the given inputs.
    pub fn new(usage: PathBuf, onet_dir: PathBuf, wages: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            usage,
            onet_dir,
            wages,
            task_ratings: None,
            output_dir,
            options: CrosswalkOptions::default(),
            usage_layout: UsageLayout::default(),
            dry_run: false,
        }
    }

    pub fn resolve(file: ConfigFile, overrides: BuildOverrides) -> Result<Self> {
        let ConfigFile {
            inputs,
            matching,
            allocation,
            usage: usage_layout,
            output,
        } = file;

        let usage = required(
            overrides.usage.or(inputs.usage),
            "usage file",
            "--usage",
            "inputs.usage",
        )?;
        let onet_dir = required(
            overrides.onet_dir.or(inputs.onet_dir),
            "taxonomy directory",
            "--onet-dir",
            "inputs.onet_dir",
        )?;
        let wages = required(
            overrides.wages.or(inputs.wages),
            "wage file",
            "--wages",
            "inputs.wages",
        )?;

        let defaults = MatchingOptions::default();
        let threshold = overrides
            .threshold
            .or(matching.threshold)
            .unwrap_or(defaults.threshold);
        if !(0.0..=100.0).contains(&threshold) {
            bail!("fuzzy threshold must be within 0..=100, got {threshold}");
        }
        let parallel = !overrides.no_parallel && matching.parallel.unwrap_or(defaults.parallel);
        let options = CrosswalkOptions {
            matching: defaults
                .with_threshold(threshold)
                .with_scorer(overrides.scorer.or(matching.scorer).unwrap_or_default())
                .with_parallel(parallel),
            allocation: overrides
                .allocation
                .or(allocation.policy)
                .unwrap_or_default(),
        };

        Ok(Self {
            usage,
            onet_dir,
            wages,
            task_ratings: overrides.task_ratings.or(inputs.task_ratings),
            output_dir: overrides
                .output_dir
                .or(output.dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            options,
            usage_layout,
            dry_run: overrides.dry_run,
        })
    }
}

fn required(value: Option<PathBuf>, what: &str, flag: &str, key: &str) -> Result<PathBuf> {
    match value {
        Some(path) => Ok(path),
        None => bail!("no {what} given; pass {flag} or set {key} in the config file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_overrides() -> BuildOverrides {
        BuildOverrides {
            usage: Some(PathBuf::from("usage.csv")),
            onet_dir: Some(PathBuf::from("onet")),
            wages: Some(PathBuf::from("oews.csv")),
            ..BuildOverrides::default()
        }
    }

    #[test]
    fn parses_every_section() {
        let config = ConfigFile::parse(
            r#"
            [inputs]
            usage = "data/usage.csv"
            onet_dir = "data/onet"

            [matching]
            threshold = 90.0
            scorer = "indel"
            parallel = false

            [allocation]
            policy = "employment"

            [usage]
            description_column = "task"
            count_column = "count"
            filters = []

            [output]
            dir = "build"
            "#,
        )
        .unwrap();

        assert_eq!(config.inputs.usage, Some(PathBuf::from("data/usage.csv")));
        assert_eq!(config.matching.threshold, Some(90.0));
        assert_eq!(config.matching.scorer, Some(SimilarityScorer::Indel));
        assert_eq!(config.allocation.policy, Some(AllocationPolicy::Employment));
        assert_eq!(config.usage.description_column, "task");
        assert!(config.usage.filters.is_empty());
        assert_eq!(config.output.dir, Some(PathBuf::from("build")));
    }

    #[test]
    fn missing_usage_section_keeps_default_layout() {
        let config = ConfigFile::parse("[matching]\nthreshold = 80.0\n").unwrap();
        assert_eq!(config.usage, UsageLayout::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ConfigFile::parse("[matching]\ncutoff = 80.0\n").is_err());
    }

    #[test]
    fn misspelled_usage_column_is_rejected() {
        assert!(ConfigFile::parse("[usage]\ndesription_column = \"task\"\n").is_err());
        let filter = "[[usage.filters]]\ncolumn = \"facet\"\nvalue = \"x\"\nvalu = \"y\"\n";
        assert!(ConfigFile::parse(filter).is_err());
    }

    #[test]
    fn flags_override_file_values() {
        let mut file = ConfigFile::default();
        file.matching.threshold = Some(90.0);
        file.allocation.policy = Some(AllocationPolicy::Employment);
        file.output.dir = Some(PathBuf::from("from-file"));

        let overrides = BuildOverrides {
            threshold: Some(70.0),
            output_dir: Some(PathBuf::from("from-flag")),
            ..full_overrides()
        };
        let settings = BuildSettings::resolve(file, overrides).unwrap();

        assert_eq!(settings.options.matching.threshold, 70.0);
        assert_eq!(settings.options.allocation, AllocationPolicy::Employment);
        assert_eq!(settings.output_dir, PathBuf::from("from-flag"));
    }

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let settings = BuildSettings::resolve(ConfigFile::default(), full_overrides()).unwrap();
        assert_eq!(settings.options, CrosswalkOptions::default());
        assert_eq!(settings.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(settings.task_ratings.is_none());
    }

    #[test]
    fn no_parallel_flag_wins_over_file() {
        let mut file = ConfigFile::default();
        file.matching.parallel = Some(true);
        let overrides = BuildOverrides {
            no_parallel: true,
            ..full_overrides()
        };
        let settings = BuildSettings::resolve(file, overrides).unwrap();
        assert!(!settings.options.matching.parallel);
    }

    #[test]
    fn missing_inputs_name_the_flag() {
        let error = BuildSettings::resolve(ConfigFile::default(), BuildOverrides::default())
            .unwrap_err()
            .to_string();
        assert!(error.contains("--usage"), "{error}");
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let overrides = BuildOverrides {
            threshold: Some(101.0),
            ..full_overrides()
        };
        assert!(BuildSettings::resolve(ConfigFile::default(), overrides).is_err());
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let mut config = ConfigFile::parse(
            "[inputs]\nusage = \"usage.csv\"\nwages = \"/abs/oews.csv\"\n",
        )
        .unwrap();
        config.rebase(Path::new("/etc/xwalk"));
        assert_eq!(config.inputs.usage, Some(PathBuf::from("/etc/xwalk/usage.csv")));
        assert_eq!(config.inputs.wages, Some(PathBuf::from("/abs/oews.csv")));
    }
}
