//! QIIME 2 16S rRNA amplicon analysis

use crate::core::{CommandSpec, Pipeline, Step};
use crate::workflows::kraken2::path_arg;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SILVA_CLASSIFIER_URL: &str =
    "https://data.qiime2.org/2023.9/common/silva-138-99-nb-classifier.qza";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Qiime2Config {
    /// Paired-end FASTQ manifest (PairedEndFastqManifestPhred33V2)
    pub manifest: PathBuf,

    /// Sample metadata TSV
    pub metadata: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pre-trained naive Bayes classifier artifact
    pub classifier: PathBuf,

    /// Where to fetch the classifier when it is absent; `null` disables the download
    #[serde(default = "default_classifier_url")]
    pub classifier_url: Option<String>,

    #[serde(default)]
    pub dada2: Dada2Params,

    #[serde(default)]
    pub tools: Qiime2Tools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dada2Params {
    pub trim_left_f: u32,
    pub trim_left_r: u32,
    pub trunc_len_f: u32,
    pub trunc_len_r: u32,
}

impl Default for Dada2Params {
    fn default() -> Self {
        Self {
            trim_left_f: 0,
            trim_left_r: 0,
            trunc_len_f: 240,
            trunc_len_r: 240,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Qiime2Tools {
    pub qiime: String,
    pub biom: String,
    pub wget: String,
}

impl Default for Qiime2Tools {
    fn default() -> Self {
        Self {
            qiime: "qiime".to_string(),
            biom: "biom".to_string(),
            wget: "wget".to_string(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("qiime2_output")
}

fn default_classifier_url() -> Option<String> {
    Some(SILVA_CLASSIFIER_URL.to_string())
}

impl Qiime2Config {
    pub fn validate(&self) -> Result<()> {
        let d = &self.dada2;
        if d.trunc_len_f != 0 && d.trim_left_f >= d.trunc_len_f {
            anyhow::bail!(
                "dada2.trim_left_f ({}) must be smaller than dada2.trunc_len_f ({})",
                d.trim_left_f,
                d.trunc_len_f
            );
        }
        if d.trunc_len_r != 0 && d.trim_left_r >= d.trunc_len_r {
            anyhow::bail!(
                "dada2.trim_left_r ({}) must be smaller than dada2.trunc_len_r ({})",
                d.trim_left_r,
                d.trunc_len_r
            );
        }
        if let Some(url) = &self.classifier_url {
            if url.trim().is_empty() {
                anyhow::bail!("classifier_url is empty; use null to disable the download");
            }
        }
        Ok(())
    }

    /// Path of an artifact inside the output directory
    fn out(&self, name: &str) -> String {
        path_arg(&self.output_dir.join(name))
    }

    fn qiime(&self, plugin: &str, action: &str) -> CommandSpec {
        CommandSpec::new(&self.tools.qiime).arg(plugin).arg(action)
    }

    /// Build the ordered pipeline
    pub fn build(&self) -> Pipeline {
        let metadata = path_arg(&self.metadata);
        let classifier = path_arg(&self.classifier);
        let d = self.dada2;

        let mut pipeline = Pipeline::new("qiime2-16s").with_output_dir(&self.output_dir);

        pipeline.push(
            Step::new("check_qiime", CommandSpec::new(&self.tools.qiime).arg("--help"))
                .with_name("Check QIIME 2 installation")
                .capture_output(true),
        );

        pipeline.push(
            Step::new(
                "import_sequences",
                self.qiime("tools", "import")
                    .args(["--type", "SampleData[PairedEndSequencesWithQuality]"])
                    .arg("--input-path")
                    .arg(path_arg(&self.manifest))
                    .arg("--output-path")
                    .arg(self.out("paired-end-demux.qza"))
                    .args(["--input-format", "PairedEndFastqManifestPhred33V2"]),
            )
            .with_name("Import paired-end reads"),
        );

        pipeline.push(
            Step::new(
                "summarize_demux",
                self.qiime("demux", "summarize")
                    .arg("--i-data")
                    .arg(self.out("paired-end-demux.qza"))
                    .arg("--o-visualization")
                    .arg(self.out("demux.qzv")),
            )
            .with_name("Summarize demultiplexed reads"),
        );

        pipeline.push(
            Step::new(
                "denoise_dada2",
                self.qiime("dada2", "denoise-paired")
                    .arg("--i-demultiplexed-seqs")
                    .arg(self.out("paired-end-demux.qza"))
                    .arg("--p-trim-left-f")
                    .arg(d.trim_left_f.to_string())
                    .arg("--p-trim-left-r")
                    .arg(d.trim_left_r.to_string())
                    .arg("--p-trunc-len-f")
                    .arg(d.trunc_len_f.to_string())
                    .arg("--p-trunc-len-r")
                    .arg(d.trunc_len_r.to_string())
                    .arg("--o-table")
                    .arg(self.out("table.qza"))
                    .arg("--o-representative-sequences")
                    .arg(self.out("rep-seqs.qza"))
                    .arg("--o-denoising-stats")
                    .arg(self.out("denoising-stats.qza")),
            )
            .with_name("Denoise with DADA2"),
        );

        pipeline.push(
            Step::new(
                "summarize_denoising",
                self.qiime("metadata", "tabulate")
                    .arg("--m-input-file")
                    .arg(self.out("denoising-stats.qza"))
                    .arg("--o-visualization")
                    .arg(self.out("denoising-stats.qzv")),
            )
            .with_name("Tabulate denoising statistics"),
        );

        pipeline.push(
            Step::new(
                "summarize_feature_table",
                self.qiime("feature-table", "summarize")
                    .arg("--i-table")
                    .arg(self.out("table.qza"))
                    .arg("--o-visualization")
                    .arg(self.out("table.qzv"))
                    .arg("--m-sample-metadata-file")
                    .arg(metadata.clone()),
            )
            .with_name("Summarize feature table"),
        );

        pipeline.push(
            Step::new(
                "tabulate_rep_seqs",
                self.qiime("feature-table", "tabulate-seqs")
                    .arg("--i-data")
                    .arg(self.out("rep-seqs.qza"))
                    .arg("--o-visualization")
                    .arg(self.out("rep-seqs.qzv")),
            )
            .with_name("Tabulate representative sequences"),
        );

        if let Some(url) = &self.classifier_url {
            pipeline.push(
                Step::new(
                    "download_classifier",
                    CommandSpec::new(&self.tools.wget)
                        .arg("-O")
                        .arg(classifier.clone())
                        .arg(url.clone()),
                )
                .with_name("Download classifier")
                .unless_exists(&self.classifier),
            );
        }

        pipeline.push(
            Step::new(
                "classify_taxonomy",
                self.qiime("feature-classifier", "classify-sklearn")
                    .arg("--i-classifier")
                    .arg(classifier)
                    .arg("--i-reads")
                    .arg(self.out("rep-seqs.qza"))
                    .arg("--o-classification")
                    .arg(self.out("taxonomy.qza")),
            )
            .with_name("Classify representative sequences"),
        );

        pipeline.push(
            Step::new(
                "taxa_barplot",
                self.qiime("taxa", "barplot")
                    .arg("--i-table")
                    .arg(self.out("table.qza"))
                    .arg("--i-taxonomy")
                    .arg(self.out("taxonomy.qza"))
                    .arg("--m-metadata-file")
                    .arg(metadata)
                    .arg("--o-visualization")
                    .arg(self.out("taxa-bar-plots.qzv")),
            )
            .with_name("Taxonomy bar plots"),
        );

        pipeline.push(self.export("export_taxonomy", "taxonomy.qza", "exported-taxonomy"));
        pipeline.push(self.export(
            "export_feature_table",
            "table.qza",
            "exported-feature-table",
        ));

        pipeline.push(
            Step::new(
                "feature_table_to_tsv",
                CommandSpec::new(&self.tools.biom)
                    .arg("convert")
                    .arg("--input-fp")
                    .arg(self.out("exported-feature-table/feature-table.biom"))
                    .arg("--output-fp")
                    .arg(self.out("feature-table.tsv"))
                    .arg("--to-tsv"),
            )
            .with_name("Convert feature table to TSV"),
        );

        pipeline.push(
            Step::new(
                "build_phylogeny",
                self.qiime("phylogeny", "align-to-tree-mafft-fasttree")
                    .arg("--i-sequences")
                    .arg(self.out("rep-seqs.qza"))
                    .arg("--o-alignment")
                    .arg(self.out("aligned-rep-seqs.qza"))
                    .arg("--o-masked-alignment")
                    .arg(self.out("masked-aligned-rep-seqs.qza"))
                    .arg("--o-tree")
                    .arg(self.out("unrooted-tree.qza"))
                    .arg("--o-rooted-tree")
                    .arg(self.out("rooted-tree.qza")),
            )
            .with_name("Build phylogenetic tree"),
        );

        pipeline.push(self.export("export_tree", "rooted-tree.qza", "exported-tree"));

        pipeline
    }

    fn export(&self, id: &str, artifact: &str, destination: &str) -> Step {
        Step::new(
            id,
            self.qiime("tools", "export")
                .arg("--input-path")
                .arg(self.out(artifact))
                .arg("--output-path")
                .arg(self.out(destination)),
        )
        .with_name(format!("Export {}", artifact))
    }
}
