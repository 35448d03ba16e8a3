//! kraken2 WGS taxonomic profiling
//!
//! Classifies each sample with kraken2, merges the per-sample reports into
//! a BIOM table, converts it to TSV and, when a taxid table is present,
//! annotates lineages with taxonkit.

use crate::core::{CommandSpec, MissingPolicy, Pipeline, Step};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Merged abundance table written by kraken-biom
pub const BIOM_FILE: &str = "taxonomic_abundance.biom";
/// TSV rendering of [`BIOM_FILE`]
pub const TSV_FILE: &str = "taxonomic_abundance.tsv";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kraken2Config {
    /// kraken2 database directory
    pub kraken_db: PathBuf,

    /// Directory holding the per-sample assemblies
    pub input_dir: PathBuf,

    /// Directory receiving reports, BIOM and TSV output
    pub output_dir: PathBuf,

    /// Sample identifiers; input files are `<input_dir>/<sample><input_suffix>`
    pub samples: Vec<String>,

    #[serde(default = "default_input_suffix")]
    pub input_suffix: String,

    /// taxonkit taxonomy dump directory
    pub taxonkit_data_dir: PathBuf,

    #[serde(default)]
    pub lineage: LineageConfig,

    #[serde(default)]
    pub tools: Kraken2Tools,
}

/// Optional taxonkit lineage annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageConfig {
    /// Tab-separated table with taxids; the step is skipped when it is missing
    pub input: PathBuf,
    pub output: PathBuf,
    /// 1-based column holding the taxid
    pub taxid_field: u32,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sequences.tsv"),
            output: PathBuf::from("sequences_with_names.tsv"),
            taxid_field: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Kraken2Tools {
    pub kraken2: String,
    pub kraken_biom: String,
    pub biom: String,
    pub taxonkit: String,
}

impl Default for Kraken2Tools {
    fn default() -> Self {
        Self {
            kraken2: "kraken2".to_string(),
            kraken_biom: "kraken-biom".to_string(),
            biom: "biom".to_string(),
            taxonkit: "taxonkit".to_string(),
        }
    }
}

fn default_input_suffix() -> String {
    ".scaftig.fa".to_string()
}

impl Kraken2Config {
    pub fn validate(&self) -> Result<()> {
        if self.samples.is_empty() {
            anyhow::bail!("kraken2 workflow needs at least one sample");
        }
        let mut seen = HashSet::new();
        for sample in &self.samples {
            if sample.is_empty() || sample.contains(['/', '\\']) {
                anyhow::bail!("Invalid sample identifier: '{}'", sample);
            }
            if !seen.insert(sample.as_str()) {
                anyhow::bail!("Duplicate sample: '{}'", sample);
            }
        }
        if self.lineage.taxid_field == 0 {
            anyhow::bail!("lineage.taxid_field is 1-based and must be at least 1");
        }
        Ok(())
    }

    pub fn input_file(&self, sample: &str) -> PathBuf {
        self.input_dir.join(format!("{}{}", sample, self.input_suffix))
    }

    pub fn report_file(&self, sample: &str) -> PathBuf {
        self.output_dir.join(format!("{}_report.txt", sample))
    }

    pub fn classification_file(&self, sample: &str) -> PathBuf {
        self.output_dir.join(format!("{}_taxonomy_kraken.txt", sample))
    }

    /// Build the ordered pipeline
    pub fn build(&self) -> Pipeline {
        let mut pipeline = Pipeline::new("kraken2-wgs").with_output_dir(&self.output_dir);

        for sample in &self.samples {
            let input = self.input_file(sample);
            let command = CommandSpec::new(&self.tools.kraken2)
                .arg("--db")
                .arg(path_arg(&self.kraken_db))
                .arg("--use-names")
                .arg("--report")
                .arg(path_arg(&self.report_file(sample)))
                .arg("--output")
                .arg(path_arg(&self.classification_file(sample)))
                .arg(path_arg(&input));

            pipeline.push(
                Step::new(format!("classify_{}", sample), command)
                    .with_name(format!("kraken2 classification of {}", sample))
                    .requires(input)
                    .on_missing(MissingPolicy::Fail),
            );
        }

        let biom = self.output_dir.join(BIOM_FILE);
        let reports = self.samples.iter().map(|s| path_arg(&self.report_file(s)));
        pipeline.push(
            Step::new(
                "kraken_biom",
                CommandSpec::new(&self.tools.kraken_biom)
                    .args(reports)
                    .arg("-o")
                    .arg(path_arg(&biom)),
            )
            .with_name("Merge reports into BIOM"),
        );

        pipeline.push(
            Step::new(
                "biom_to_tsv",
                CommandSpec::new(&self.tools.biom)
                    .arg("convert")
                    .arg("-i")
                    .arg(path_arg(&biom))
                    .arg("-o")
                    .arg(path_arg(&self.output_dir.join(TSV_FILE)))
                    .arg("--to-tsv"),
            )
            .with_name("Convert BIOM to TSV"),
        );

        pipeline.push(
            Step::new(
                "taxonkit_lineage",
                CommandSpec::new(&self.tools.taxonkit)
                    .arg("lineage")
                    .arg("--data-dir")
                    .arg(path_arg(&self.taxonkit_data_dir))
                    .arg("--taxid-field")
                    .arg(self.lineage.taxid_field.to_string())
                    .arg("--out-file")
                    .arg(path_arg(&self.lineage.output))
                    .arg(path_arg(&self.lineage.input)),
            )
            .with_name("Annotate lineages with taxonkit")
            .requires(&self.lineage.input),
        );

        pipeline
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
