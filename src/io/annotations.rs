use std::path::Path;

use tracing::debug;

use crate::config::AnnotationSettings;
use crate::error::{DatasetError, Result};
use crate::models::AnnotationEntry;

/// Read an annotation table (CSV with a header row)
///
/// Every row yields one entry with `nb_captions` captions taken from the
/// caption columns in order. Captions are trimmed but otherwise untouched.
pub fn read_annotations(
    path: &Path,
    settings: &AnnotationSettings,
) -> Result<Vec<AnnotationEntry>> {
    let csv_err = |source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    let column_position = |column: &str| {
        headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| DatasetError::MissingColumn {
                path: path.to_path_buf(),
                row: 0,
                column: column.to_string(),
            })
    };

    let audio_column = column_position(&settings.audio_file_column)?;
    let caption_fields = settings.caption_fields();
    let caption_columns = caption_fields
        .iter()
        .map(|field| column_position(field))
        .collect::<Result<Vec<_>>>()?;

    let mut entries = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row.map_err(csv_err)?;
        // Header is row 0
        let row_number = i + 1;
        let field = |position: usize, column: &str| {
            row.get(position)
                .map(|value| value.trim().to_string())
                .ok_or_else(|| DatasetError::MissingColumn {
                    path: path.to_path_buf(),
                    row: row_number,
                    column: column.to_string(),
                })
        };

        let audio_file_name = field(audio_column, &settings.audio_file_column)?;
        let captions = caption_columns
            .iter()
            .zip(caption_fields.iter())
            .map(|(&position, column)| field(position, column))
            .collect::<Result<Vec<_>>>()?;

        entries.push(AnnotationEntry {
            audio_file_name,
            captions,
        });
    }

    debug!("Read {} annotation entries from {:?}", entries.len(), path);
    Ok(entries)
}
