use thiserror::Error;

/// Structural failures raised by the report pipeline.
///
/// Numeric coercion failures are deliberately NOT represented here; dirty
/// cells default to 0.0 (see `util::parse_money_lenient`). Only structural
/// problems halt a run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Required columns are absent after alias resolution. Carries every
    /// missing canonical name so the user can fix the export in one pass.
    #[error("{source_label}: missing required columns: {}", .missing.join(", "))]
    Schema {
        source_label: &'static str,
        missing: Vec<String>,
    },

    /// The file could not be read or parsed as tabular data at all.
    #[error("parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("excel write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Internal-contract violation in the decision engine.
    #[error("compute error: {0}")]
    Compute(String),
}

impl ReportError {
    pub fn schema(source_label: &'static str, missing: Vec<String>) -> Self {
        ReportError::Schema {
            source_label,
            missing,
        }
    }
}
