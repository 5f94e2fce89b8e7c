use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;

use crate::algorithms::Status;
use crate::routines::settings::Settings;
use crate::structs::memberships::Memberships;
use crate::structs::topics::Topics;

/// Defines the result of a pLSA run
///
/// A [PlsaResult] contains the fitted factor matrices together with the
/// metadata needed to interpret the run: the final log-likelihood, the
/// number of cycles performed, the stopping [Status] and the per-checkpoint
/// convergence log.
#[derive(Debug, Clone)]
pub struct PlsaResult {
    memberships: Memberships,
    topics: Topics,
    objf: f64,
    cycles: usize,
    status: Status,
    cycle_log: CycleLog,
    settings: Settings,
}

impl PlsaResult {
    pub(crate) fn new(
        memberships: Memberships,
        topics: Topics,
        objf: f64,
        cycles: usize,
        status: Status,
        cycle_log: CycleLog,
        settings: Settings,
    ) -> Self {
        Self {
            memberships,
            topics,
            objf,
            cycles,
            status,
            cycle_log,
            settings,
        }
    }

    /// The fitted document-topic matrix P(z|d)
    pub fn memberships(&self) -> &Memberships {
        &self.memberships
    }

    /// The fitted topic-word matrix P(w|z)
    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Final log-likelihood of the corpus under the fitted model
    pub fn objf(&self) -> f64 {
        self.objf
    }

    /// Number of EM cycles performed
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// The stopping condition that ended the run
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Log-likelihood checkpoints recorded during the run
    pub fn cycle_log(&self) -> &CycleLog {
        &self.cycle_log
    }

    /// Consume the result, yielding the factor matrix pair
    pub fn into_matrices(self) -> (Memberships, Topics) {
        (self.memberships, self.topics)
    }

    /// Write all result files to the configured output folder
    pub fn write_outputs(&self) -> Result<()> {
        self.write_memberships()?;
        self.write_topics()?;
        self.write_cycles()?;
        self.write_meta()?;
        self.write_settings();
        Ok(())
    }

    /// Writes memberships.csv, the document-topic probabilities
    pub fn write_memberships(&self) -> Result<()> {
        let outputfile = OutputFile::new(&self.settings.output.path, "memberships.csv")?;
        self.memberships.to_csv(outputfile.file_owned())
    }

    /// Writes topics.csv, the topic-word probabilities
    pub fn write_topics(&self) -> Result<()> {
        let outputfile = OutputFile::new(&self.settings.output.path, "topics.csv")?;
        self.topics.to_csv(outputfile.file_owned())
    }

    /// Writes cycles.csv, the convergence checkpoints of the run
    pub fn write_cycles(&self) -> Result<()> {
        self.cycle_log.write(&self.settings.output.path)
    }

    /// Writes meta.csv, summarizing how the run stopped
    pub fn write_meta(&self) -> Result<()> {
        let outputfile = OutputFile::new(&self.settings.output.path, "meta.csv")?;
        let mut writer = WriterBuilder::new().from_writer(outputfile.file_owned());
        writer.write_record(["converged", "cycles", "log_likelihood"])?;
        writer.write_record(&[
            self.converged().to_string(),
            self.cycles.to_string(),
            self.objf.to_string(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    /// Writes settings.json, the configuration used for the run
    ///
    /// Settings carrying a custom initialization pair cannot be serialized;
    /// the failure is logged and the other output files are unaffected.
    fn write_settings(&self) {
        let result = (|| -> Result<()> {
            let json = serde_json::to_string_pretty(&self.settings)?;
            let outputfile = OutputFile::new(&self.settings.output.path, "settings.json")?;
            let mut file = outputfile.file();
            file.write_all(json.as_bytes())?;
            Ok(())
        })();

        if let Err(e) = result {
            tracing::warn!("Error while writing settings: {}", e);
        }
    }
}

/// Summary of one convergence checkpoint
#[derive(Debug, Clone, Serialize)]
pub struct Cycle {
    pub cycle: usize,
    pub log_likelihood: f64,
    pub delta: f64,
}

/// This holds a vector of [Cycle] objects to provide a more detailed log
#[derive(Debug, Clone, Serialize, Default)]
pub struct CycleLog {
    cycles: Vec<Cycle>,
}

impl CycleLog {
    pub fn new() -> Self {
        Self { cycles: Vec::new() }
    }

    pub fn push(&mut self, cycle: Cycle) {
        self.cycles.push(cycle);
    }

    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Write the log as cycles.csv in the given folder
    pub fn write(&self, folder: &str) -> Result<()> {
        let outputfile = OutputFile::new(folder, "cycles.csv")?;
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_writer(outputfile.file_owned());
        for cycle in &self.cycles {
            writer.serialize(cycle)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Contains all the necessary information of an output file
#[derive(Debug)]
pub struct OutputFile {
    file: File,
    relative_path: PathBuf,
}

impl OutputFile {
    pub fn new(folder: &str, file_name: &str) -> Result<Self> {
        let relative_path = Path::new(&folder).join(file_name);

        if let Some(parent) = relative_path.parent() {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directories for {:?}", parent))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&relative_path)
            .with_context(|| format!("Failed to open file: {:?}", relative_path))?;

        Ok(OutputFile {
            file,
            relative_path,
        })
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn file_owned(self) -> File {
        self.file
    }

    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }
}
