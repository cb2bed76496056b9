//! Services command: build a deduplicated service list from free text.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use nfse_core::{normalize_services, PdfExtractor, ServiceListWriter};

use crate::inputs::extension;

/// Arguments for the services command.
#[derive(Args)]
pub struct ServicesArgs {
    /// PDF or plain text files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the list to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also render the list as a PDF
    #[arg(long)]
    pdf: Option<PathBuf>,
}

pub async fn run(args: ServicesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;

    let mut text = String::new();
    for path in &args.inputs {
        let content = read_text(path)?;
        debug!("Read {} characters from {}", content.len(), path.display());
        text.push_str(&content);
        text.push('\n');
    }

    let services = normalize_services(&text);
    info!("Found {} distinct services", services.len());

    match args.output {
        Some(ref path) => {
            let mut content = services.join("\n");
            if !content.is_empty() {
                content.push('\n');
            }
            fs::write(path, content)?;
            eprintln!(
                "{} {} services written to {}",
                style("✓").green(),
                services.len(),
                path.display()
            );
        }
        None => {
            for service in &services {
                println!("{}", service);
            }
        }
    }

    if let Some(ref path) = args.pdf {
        ServiceListWriter::new(&config.output.services_pdf_title)
            .with_font_size(config.output.services_pdf_font_size)
            .write(&services, path)?;
        eprintln!(
            "{} Service list written to {}",
            style("✓").green(),
            path.display()
        );
    }

    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    if extension(path) == "pdf" {
        let data = fs::read(path)?;
        PdfExtractor::text_from_bytes(&data)
            .with_context(|| format!("Failed to extract text from {}", path.display()))
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }
}
