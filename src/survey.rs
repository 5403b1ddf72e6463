//! Survey table parsing.
//!
//! The spreadsheet export carries a few banner rows above the real header, so
//! the CSV is read headerless and the question row is picked out by index.
//! Columns are matched on the exact question text as it appears in the form.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::{debug, info};

pub const ZIP_QUESTION: &str = "What was your childhood zip code (if there are multiple, choose the one from when you were in your peak Barney-hating age)";
pub const COUNTRY_QUESTION: &str = "If you're not from the US, what country are you from?";
pub const PEAK_HATE_QUESTION: &str =
    "If you sang anti-Barney songs, what was the age when your Barney hate peaked?";
// Trailing space is part of the form's question text.
pub const BIRTH_YEAR_QUESTION: &str = "What year were you born? ";

/// Zero-based row index of the question header in the exported sheet.
///
/// Completely empty lines are skipped by the reader and do not count; a
/// banner row of bare commas (`,,,,`) does.
pub const DEFAULT_HEADER_ROW: usize = 3;

const REQUIRED_QUESTIONS: [&str; 4] = [
    ZIP_QUESTION,
    COUNTRY_QUESTION,
    PEAK_HATE_QUESTION,
    BIRTH_YEAR_QUESTION,
];

/// A single survey answer row, exactly as typed by the respondent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawResponse {
    #[serde(rename = "What was your childhood zip code (if there are multiple, choose the one from when you were in your peak Barney-hating age)")]
    pub zip: String,
    #[serde(rename = "If you're not from the US, what country are you from?")]
    pub country: String,
    #[serde(rename = "If you sang anti-Barney songs, what was the age when your Barney hate peaked?")]
    pub peak_hate: String,
    #[serde(rename = "What year were you born? ")]
    pub birth_year: String,
}

/// Parses the CSV export, using row `header_row` as the header and every
/// row after it as a response.
pub fn parse_survey(bytes: &[u8], header_row: usize) -> Result<Vec<RawResponse>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut headers: Option<StringRecord> = None;
    let mut responses = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let mut row = result.with_context(|| format!("malformed survey row {index}"))?;

        let Some(header) = &headers else {
            if index == header_row {
                check_questions(&row, header_row)?;
                headers = Some(row);
            }
            continue;
        };

        while row.len() < header.len() {
            row.push_field("");
        }

        let response: RawResponse = row
            .deserialize(Some(header))
            .with_context(|| format!("failed to read survey row {index}"))?;
        responses.push(response);
    }

    if headers.is_none() {
        bail!("survey has no header row at index {header_row}");
    }

    info!(responses = responses.len(), header_row, "Survey parsed");
    Ok(responses)
}

fn check_questions(header: &StringRecord, header_row: usize) -> Result<()> {
    for question in REQUIRED_QUESTIONS {
        if !header.iter().any(|cell| cell == question) {
            bail!("survey header row {header_row} is missing column '{question}'");
        }
    }
    debug!(columns = header.len(), "Survey header matched");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_line() -> String {
        let mut w = csv::Writer::from_writer(vec![]);
        w.write_record([
            "Timestamp",
            ZIP_QUESTION,
            COUNTRY_QUESTION,
            PEAK_HATE_QUESTION,
            BIRTH_YEAR_QUESTION,
        ])
        .unwrap();
        String::from_utf8(w.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_parse_survey_skips_banner_rows() {
        let csv = format!(
            "Barney survey,,,,\nresults,,,,\n,,,,\n{}1/1/2020,10001,,8 to 10,1988\n",
            header_line()
        );
        let rows = parse_survey(csv.as_bytes(), 3).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].zip, "10001");
        assert_eq!(rows[0].country, "");
        assert_eq!(rows[0].peak_hate, "8 to 10");
        assert_eq!(rows[0].birth_year, "1988");
    }

    #[test]
    fn test_parse_survey_blank_lines_do_not_count() {
        let csv = format!(
            "Barney survey,,,,\n\n\n,,,,\n{}1/1/2020,10001,,7,1988\n",
            header_line()
        );

        assert!(parse_survey(csv.as_bytes(), 4).is_err());
        let rows = parse_survey(csv.as_bytes(), 2).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].peak_hate, "7");
    }

    #[test]
    fn test_parse_survey_pads_short_rows() {
        let csv = format!("{}1/1/2020,02134\n", header_line());
        let rows = parse_survey(csv.as_bytes(), 0).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].zip, "02134");
        assert_eq!(rows[0].birth_year, "");
    }

    #[test]
    fn test_parse_survey_missing_column() {
        let csv = "Timestamp,What year were you born? \n1/1/2020,1990\n";
        let err = parse_survey(csv.as_bytes(), 0).unwrap_err();
        assert!(err.to_string().contains("missing column"));
    }

    #[test]
    fn test_parse_survey_birth_year_header_needs_trailing_space() {
        let csv = header_line().replace("What year were you born? ", "What year were you born?");
        assert!(parse_survey(csv.as_bytes(), 0).is_err());
    }

    #[test]
    fn test_parse_survey_header_row_out_of_range() {
        let csv = format!("{}1/1/2020,10001,,9,1990\n", header_line());
        let err = parse_survey(csv.as_bytes(), 5).unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }

    #[test]
    fn test_parse_survey_header_only() {
        let rows = parse_survey(header_line().as_bytes(), 0).unwrap();
        assert!(rows.is_empty());
    }
}
