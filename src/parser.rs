//! CSV decoder for commute observation exports.

use anyhow::Result;

use crate::model::CommuteObservation;

/// Decodes a CSV export of observation rows from raw bytes.
///
/// # Errors
///
/// Returns an error when a row fails to deserialize (malformed field types
/// or a ragged record). An input with headers only decodes to an empty list.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<CommuteObservation>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let row: CommuteObservation = result?;
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_input() {
        let rows = parse_rows(b"").expect("empty input is fine");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_minimal_rows() {
        let csv = "\
date,route_name,is_commuting_day,duration_minutes,congestion_pricing
2025-01-06,New Jersey,true,42.5,false
2025-01-07,,true,,true
";
        let rows = parse_rows(csv.as_bytes()).expect("parse");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].route_name.as_deref(), Some("New Jersey"));
        assert_eq!(rows[0].duration_minutes, Some(42.5));
        assert_eq!(rows[0].congestion_pricing, Some(false));
        // empty cells stay absent, they never default to zero or false
        assert_eq!(rows[1].route_name, None);
        assert_eq!(rows[1].duration_minutes, None);
        // columns the export omits entirely stay absent too
        assert_eq!(rows[0].rounded_time, None);
    }

    #[test]
    fn test_parse_rejects_bad_field_types() {
        let csv = "\
date,duration_minutes
2025-01-06,not-a-number
";
        assert!(parse_rows(csv.as_bytes()).is_err());
    }
}
