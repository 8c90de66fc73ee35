//! Export of form responses as CSV.

use crate::models::{FormRecord, FormResponse};
use chrono::SecondsFormat;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

/// Header of the trailing timestamp column.
pub const SUBMITTED_AT_HEADER: &str = "Submitted At";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("No responses to export")]
    NoResponses,
    #[error("Failed to write CSV: {0}")]
    Write(String),
}

impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self {
        ExportError::Write(e.to_string())
    }
}

/// A rendered CSV document and the name to download it as.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Service for exporting responses.
pub struct ExportService;

impl ExportService {
    /// Header row: one column per field, in form order, then the submission time.
    pub fn header(form: &FormRecord) -> Vec<String> {
        form.fields
            .iter()
            .map(|f| f.label.clone())
            .chain(std::iter::once(SUBMITTED_AT_HEADER.to_string()))
            .collect()
    }

    /// One row per response. Cells follow the form's current field order, so
    /// answers to fields removed since submission are not exported.
    pub fn rows(form: &FormRecord, responses: &[FormResponse]) -> Vec<Vec<String>> {
        responses
            .iter()
            .map(|response| {
                form.fields
                    .iter()
                    .map(|field| {
                        response
                            .answer(&field.id)
                            .map(|a| a.value.display())
                            .unwrap_or_default()
                    })
                    .chain(std::iter::once(
                        response
                            .submitted_at
                            .to_rfc3339_opts(SecondsFormat::Millis, true),
                    ))
                    .collect()
            })
            .collect()
    }

    /// Render the responses of `form` as a CSV download.
    pub fn export_csv(
        form: &FormRecord,
        responses: &[FormResponse],
    ) -> Result<CsvExport, ExportError> {
        if responses.is_empty() {
            return Err(ExportError::NoResponses);
        }

        // RFC 4180: quote only where needed, CRLF line endings.
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(Vec::new());
        writer.write_record(Self::header(form))?;
        for row in Self::rows(form, responses) {
            writer.write_record(&row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Write(e.error().to_string()))?;
        let content =
            String::from_utf8(bytes).map_err(|e| ExportError::Write(e.to_string()))?;

        Ok(CsvExport {
            filename: Self::filename(&form.title),
            content,
        })
    }

    /// `<slug>-responses.csv`, where the slug keeps ASCII alphanumerics and
    /// collapses everything else into single dashes.
    pub fn filename(title: &str) -> String {
        let mut slug = String::new();
        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-');
        let slug = if slug.is_empty() { "form" } else { slug };
        format!("{}-responses.csv", slug)
    }
}
