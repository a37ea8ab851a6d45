use crate::error::StorageError;
use crate::models::ProductRecord;

/// Render a record as `Field,Value` CSV with CRLF line endings.
pub fn encode_record(record: &ProductRecord) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(["Field", "Value"])
        .map_err(|e| StorageError::Encode(e.to_string()))?;
    for field in &record.fields {
        writer
            .write_record([field.label.as_str(), field.value.as_str()])
            .map_err(|e| StorageError::Encode(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| StorageError::Encode(e.to_string()))
}
