//! `cytometry`: load the cell-count file, run the analyses, write reports.
//!
//! # Usage
//!
//! ```text
//! cytometry
//! cytometry --input data/cell-count.csv --db cytometry_data.db --output output
//! ```

mod pipeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cyto_core::{analysis::PopulationStatistics, cohort::CohortFilter};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cytometry", about = "Immune cell population analysis pipeline")]
struct Args {
  /// Wide cell-count CSV file.
  #[arg(long, env = "CYTO_INPUT", default_value = "data/cell-count.csv")]
  input: PathBuf,

  /// SQLite store, replaced on every run.
  #[arg(long, env = "CYTO_DB", default_value = "cytometry_data.db")]
  db: PathBuf,

  /// Directory for report artifacts.
  #[arg(long, env = "CYTO_OUTPUT", default_value = "output")]
  output: PathBuf,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Failures are reported per stage; the process itself still exits cleanly.
  if let Err(e) = run(&args).await {
    eprintln!("{e:#}");
  }
  Ok(())
}

async fn run(args: &Args) -> Result<()> {
  let cohort = CohortFilter::default();

  println!("Cytometry Data Analysis");
  println!("{}", "=".repeat(60));

  heading("Step 1: Store Setup and Data Loading");
  let (store, report, summary) = pipeline::load(&args.input, &args.db)
    .await
    .map_err(|e| e.context("Store setup failed"))?;
  println!("Loaded {} rows into {}", report.rows, args.db.display());
  println!("Data Summary:");
  println!("   - Projects: {}", summary.projects);
  println!("   - Subjects: {}", summary.subjects);
  println!("   - Samples: {}", summary.samples);
  println!("   - Conditions: {}", summary.conditions);
  println!("   - Treatments: {}", summary.treatments);

  heading("Step 2: Running Analysis Pipeline");
  let reports = pipeline::analyse(&store, &cohort)
    .await
    .map_err(|e| e.context("Analysis pipeline failed"))?;
  println!("Data overview: {} rows", reports.overview.len());
  print_statistics(&reports.comparison.statistics, &cohort);
  println!(
    "Baseline samples: {} ({} subjects)",
    reports.baseline.total_samples, reports.baseline.unique_subjects
  );

  heading("Step 3: Writing Reports");
  let artifacts = pipeline::write(&reports, &args.output)
    .map_err(|e| e.context("Writing reports failed"))?;
  for artifact in &artifacts {
    if artifact.written {
      println!("{} - {}", artifact.file_name, artifact.description);
    } else {
      println!("{} - Not generated", artifact.file_name);
    }
  }

  heading("Step 4: Interactive Dashboard");
  println!("To explore the results interactively, run:");
  println!("    dashboard --config dashboard.toml");
  println!("(or set CYTO_STORE_PATH={} before starting it)", args.db.display());

  println!("\nAnalysis complete. Results are in '{}'.", args.output.display());
  Ok(())
}

fn heading(title: &str) {
  println!("\n{title}");
  println!("{}", "-".repeat(40));
}

fn print_statistics(statistics: &[PopulationStatistics], cohort: &CohortFilter) {
  if statistics.is_empty() {
    println!("No statistical results available for {}.", cohort.describe());
    return;
  }
  println!("\nResponders vs non-responders ({}):\n", cohort.describe());
  for s in statistics {
    println!("{}:", s.population.display_name());
    println!(
      "  Responders: {:.2}% ± {:.2}% (n={})",
      s.responders_mean, s.responders_std, s.n_responders
    );
    println!(
      "  Non-responders: {:.2}% ± {:.2}% (n={})",
      s.non_responders_mean, s.non_responders_std, s.n_non_responders
    );
    println!("  Mann-Whitney U: {:.2}", s.mann_whitney_u);
    println!("  p-value: {:.4}", s.p_value);
    println!("  Effect size: {:.3}", s.effect_size);
    println!("  Significant: {}\n", if s.significant { "Yes" } else { "No" });
  }
}
