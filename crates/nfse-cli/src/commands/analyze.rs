//! Analyze command: extract records from NFS-e XML files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use nfse_core::{BatchReport, ExtractionRecord, NfseConfig, NfseExtractor, ServiceListWriter};

use crate::inputs;

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// XML or ZIP files, directories or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output directory for the CSV report and service list PDF
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Format printed to stdout when no output directory is given
    #[arg(short, long, value_enum, default_value = "table")]
    format: ReportFormat,

    /// Write the service list PDF to this path
    #[arg(long)]
    services_pdf: Option<PathBuf>,

    /// Write the service list as plain text to this path
    #[arg(long)]
    services_txt: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    /// Aligned columns
    Table,
    /// CSV with a header row
    Csv,
    /// JSON report with records and services
    Json,
}

const CSV_HEADER: [&str; 4] = ["arquivo", "numero", "valor", "tipo_servico"];

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    let documents = inputs::collect_documents(&args.inputs)?;
    if documents.is_empty() {
        anyhow::bail!("No XML files found in: {}", args.inputs.join(", "));
    }
    info!("Analyzing {} documents", documents.len());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(format!("Extracting {} documents", documents.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let extractor = NfseExtractor::from_config(&config.extraction);
    let report = extractor.extract_batch(&documents);
    spinner.finish_and_clear();

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;

        let csv_path = output_dir.join(&config.output.csv_file_name);
        let mut file = fs::File::create(&csv_path)?;
        write_csv(&mut file, &report.records, &config)?;
        eprintln!(
            "{} Records written to {}",
            style("✓").green(),
            csv_path.display()
        );

        let pdf_path = output_dir.join(&config.output.services_pdf_file_name);
        write_services_pdf(&report.services, &pdf_path, &config)?;
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        match args.format {
            ReportFormat::Table => write_table(&mut out, &report.records)?,
            ReportFormat::Csv => write_csv(&mut out, &report.records, &config)?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            }
        }
    }

    if let Some(ref path) = args.services_pdf {
        write_services_pdf(&report.services, path, &config)?;
    }

    if let Some(ref path) = args.services_txt {
        write_services_txt(&report, path)?;
    }

    print_summary(&report, start);

    Ok(())
}

fn write_csv<W: Write>(
    writer: W,
    records: &[ExtractionRecord],
    config: &NfseConfig,
) -> anyhow::Result<()> {
    let delimiter = u8::try_from(config.output.csv_delimiter).map_err(|_| {
        anyhow::anyhow!(
            "CSV delimiter must be a single-byte character, got {:?}",
            config.output.csv_delimiter
        )
    })?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record([
            &record.source,
            &record.number,
            &record.value,
            &record.description,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_table<W: Write>(mut out: W, records: &[ExtractionRecord]) -> anyhow::Result<()> {
    let rows: Vec<[String; 4]> = records
        .iter()
        .map(|r| {
            [
                r.source.clone(),
                r.number.clone(),
                r.value.clone(),
                r.description.lines().collect::<Vec<_>>().join("; "),
            ]
        })
        .collect();

    let mut widths = CSV_HEADER.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header = CSV_HEADER.map(String::from);
    for row in std::iter::once(&header).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }

    Ok(())
}

fn write_services_pdf(services: &[String], path: &Path, config: &NfseConfig) -> anyhow::Result<()> {
    let subtitle = format!(
        "Gerado em {}",
        chrono::Local::now().format("%d/%m/%Y %H:%M")
    );

    ServiceListWriter::new(&config.output.services_pdf_title)
        .with_subtitle(subtitle)
        .with_font_size(config.output.services_pdf_font_size)
        .write(services, path)?;

    debug!("Wrote {} services to {}", services.len(), path.display());
    eprintln!(
        "{} Service list written to {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

fn write_services_txt(report: &BatchReport, path: &Path) -> anyhow::Result<()> {
    let mut content = report.services.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content)?;

    eprintln!(
        "{} Service list written to {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}

fn print_summary(report: &BatchReport, start: Instant) {
    let failed = report.failed_count();

    eprintln!();
    eprintln!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        report.records.len(),
        start.elapsed()
    );
    eprintln!("  {} distinct services", report.services.len());

    if failed > 0 {
        eprintln!("  {} {} unreadable", style("✗").red(), failed);
        for record in report.failed() {
            eprintln!("    - {}: {}", record.source, record.number);
        }
    }
}
