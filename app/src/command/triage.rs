//! Standalone triage report command.
//!
//! Reads conversation notes (typically the assistant's final reply) from a
//! file or stdin and prints the generated summary and detailed report.

use std::io::Read;
use std::path::PathBuf;

use medichat_triage::{Patient, ReportLine, ReportSection, TriageReporter};
use tracing::info;

use super::{CommandStrategy, init_common_components};

/// Input parameters for the Triage command strategy.
#[derive(Debug, Clone)]
pub struct TriageInput {
    /// File with the conversation notes; stdin when absent.
    pub input: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    /// Skip the detailed report.
    pub summary_only: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TriageStrategy;

impl CommandStrategy for TriageStrategy {
    type Input = TriageInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components(input.provider.as_deref(), input.model)?;

        let notes = read_notes(input.input.as_ref())?;
        if notes.trim().is_empty() {
            anyhow::bail!("no conversation notes provided");
        }

        let mut patient = Patient::default();
        if let Some(name) = input.name {
            patient.name = name;
        }
        if let Some(age) = input.age {
            patient.age = age;
        }
        if let Some(sex) = input.sex {
            patient.sex = sex;
        }

        let reporter = TriageReporter::new(common.provider, common.model);

        println!("--- Triage Summary ---");
        let summary = reporter.generate_summary(&notes).await?;
        println!("{summary}\n");

        if !input.summary_only {
            println!("--- Detailed Report ---");
            let sections = reporter.generate_report(&patient, &notes).await?;
            info!("generated report with {} sections", sections.len());
            print_sections(&sections);
        }

        Ok(())
    }
}

fn read_notes(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Render parsed report sections to the terminal.
pub(crate) fn print_sections(sections: &[ReportSection]) {
    for section in sections {
        println!("{}", section.title);
        for line in &section.lines {
            match line {
                ReportLine::Bullet(text) => println!("  - {text}"),
                ReportLine::Text(text) => println!("  {text}"),
            }
        }
        println!();
    }
}
