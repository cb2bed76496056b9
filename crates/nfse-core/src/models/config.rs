//! Configuration structures.

use serde::{Deserialize, Serialize};

use super::record::{NOT_FOUND, READ_ERROR};

/// Main configuration for the nfse tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfseConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Report output configuration.
    pub output: OutputConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Text stored for fields that were not found.
    pub not_found_label: String,

    /// Prefix of the marker stored for unreadable documents.
    pub read_error_label: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            not_found_label: NOT_FOUND.to_string(),
            read_error_label: READ_ERROR.to_string(),
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name of the records CSV inside the output directory.
    pub csv_file_name: String,

    /// CSV field delimiter.
    pub csv_delimiter: char,

    /// File name of the service list PDF inside the output directory.
    pub services_pdf_file_name: String,

    /// Title printed at the top of the service list PDF.
    pub services_pdf_title: String,

    /// Font size (points) of the service list PDF body.
    pub services_pdf_font_size: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_file_name: "resultados_analise.csv".to_string(),
            csv_delimiter: ',',
            services_pdf_file_name: "lista_servicos.pdf".to_string(),
            services_pdf_title: "Lista de Serviços".to_string(),
            services_pdf_font_size: 11.0,
        }
    }
}

impl NfseConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
