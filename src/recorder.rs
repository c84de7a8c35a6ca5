//! @ai:module:intent CSV persistence for result records
//! @ai:module:layer infrastructure
//! @ai:module:public_api ResultRecord, write_records, read_records
//! @ai:module:stateless true

use crate::plan::ConversationUnit;
use crate::provider::{Outcome, OutcomeStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent One persisted row of the research output.
///            Field order here is the on-disk column order.
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// 1-based, equals the unit's sequence_index + 1
    pub conversation_id: u64,
    /// RFC 3339 capture time of the call's resolution
    pub timestamp: String,
    pub question_id: String,
    pub category: String,
    pub repetition: u32,
    pub question: String,
    pub response: String,
    pub tokens_sent: u32,
    pub tokens_received: u32,
    pub status: OutcomeStatus,
}

impl ResultRecord {
    /// @ai:intent Merge a conversation unit with its resolved outcome
    /// @ai:effects pure
    pub fn from_outcome(
        unit: &ConversationUnit,
        outcome: Outcome,
        resolved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            conversation_id: unit.sequence_index as u64 + 1,
            timestamp: resolved_at.to_rfc3339(),
            question_id: unit.question_id.clone(),
            category: unit.category.clone(),
            repetition: unit.repetition,
            question: unit.question.clone(),
            response: outcome.response,
            tokens_sent: outcome.tokens_sent,
            tokens_received: outcome.tokens_received,
            status: outcome.status,
        }
    }
}

/// @ai:intent Write the full record sequence to a CSV file in one pass,
///            header first, overwriting any existing file
/// @ai:effects fs:write
pub fn write_records(path: &Path, records: &[ResultRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write record {}", record.conversation_id))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;

    Ok(())
}

/// @ai:intent Read a record sequence back from a CSV file in on-disk order
/// @ai:effects fs:read
pub fn read_records(path: &Path) -> Result<Vec<ResultRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open record file: {}", path.display()))?;

    let mut records = Vec::new();

    for row in reader.deserialize() {
        let record: ResultRecord =
            row.with_context(|| format!("Failed to parse record file: {}", path.display()))?;
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_record(conversation_id: u64, status: OutcomeStatus) -> ResultRecord {
        ResultRecord {
            conversation_id,
            timestamp: "2026-08-24T12:00:00+00:00".to_string(),
            question_id: "opt_out".to_string(),
            category: "phenomenology".to_string(),
            repetition: 1,
            question: "Are there tasks you would opt out of?".to_string(),
            response: "A response, with a comma and \"quotes\".".to_string(),
            tokens_sent: 42,
            tokens_received: 128,
            status,
        }
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.csv");

        let records = vec![
            sample_record(1, OutcomeStatus::Success),
            sample_record(2, OutcomeStatus::Error),
            sample_record(3, OutcomeStatus::Blocked),
        ];

        write_records(&path, &records).unwrap();
        let read_back = read_records(&path).unwrap();

        assert_eq!(read_back, records);
    }

    #[test]
    fn test_header_matches_schema_column_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.csv");

        write_records(&path, &[sample_record(1, OutcomeStatus::Success)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "conversation_id,timestamp,question_id,category,repetition,\
             question,response,tokens_sent,tokens_received,status"
        );
    }

    #[test]
    fn test_write_overwrites_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.csv");

        let first = vec![
            sample_record(1, OutcomeStatus::Success),
            sample_record(2, OutcomeStatus::Success),
        ];
        write_records(&path, &first).unwrap();

        let second = vec![sample_record(9, OutcomeStatus::Error)];
        write_records(&path, &second).unwrap();

        let read_back = read_records(&path).unwrap();
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].conversation_id, 9);
    }

    #[test]
    fn test_multiline_response_survives_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.csv");

        let mut record = sample_record(1, OutcomeStatus::Success);
        record.response = "line one\nline two\n\nline four".to_string();

        write_records(&path, std::slice::from_ref(&record)).unwrap();
        let read_back = read_records(&path).unwrap();

        assert_eq!(read_back[0].response, record.response);
    }
}
