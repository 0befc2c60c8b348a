use serde::Serialize;

use crate::CsvRecord;

/// Wire shape of one record: positional fields renamed to `column_1`..`column_8`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPayload<'a> {
    pub column_1: &'a str,
    pub column_2: &'a str,
    pub column_3: &'a str,
    pub column_4: &'a str,
    pub column_5: &'a str,
    pub column_6: &'a str,
    /// Always a JSON string, including when the content looks numeric.
    pub column_7: &'a str,
    pub column_8: &'a str,
}

impl<'a> From<&'a CsvRecord> for RecordPayload<'a> {
    fn from(record: &'a CsvRecord) -> Self {
        let [c1, c2, c3, c4, c5, c6, c7, c8] = record.cells();
        Self {
            column_1: c1,
            column_2: c2,
            column_3: c3,
            column_4: c4,
            column_5: c5,
            column_6: c6,
            column_7: c7,
            column_8: c8,
        }
    }
}

/// Serializes records as a JSON array, pretty-printed with four-space indentation.
pub fn render_payload(records: &[CsvRecord]) -> Result<String, serde_json::Error> {
    let payload: Vec<RecordPayload<'_>> = records.iter().map(RecordPayload::from).collect();

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    payload.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
