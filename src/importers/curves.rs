use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::{csv_error, line_number, parse_date};
use crate::error::{PerformanceError, Result};
use crate::index::CurveIndex;

/// `date,security,accumulated`, accumulated return as a fraction
#[derive(Debug, Deserialize)]
struct CurveRow {
    date: String,
    security: String,
    accumulated: f64,
}

pub fn load_curves(path: &Path) -> Result<CurveIndex> {
    let file = File::open(path).map_err(|e| {
        PerformanceError::Parse(format!("cannot open {}: {}", path.display(), e))
    })?;
    info!("Reading return curves from {:?}", path);
    read_curves(file)
}

pub fn read_curves<R: Read>(reader: R) -> Result<CurveIndex> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut index = CurveIndex::new();
    for (idx, row) in csv_reader.deserialize::<CurveRow>().enumerate() {
        let line = line_number(idx);
        let row = row.map_err(csv_error)?;
        if !row.accumulated.is_finite() {
            return Err(PerformanceError::Parse(format!(
                "line {line}: accumulated return must be finite"
            )));
        }
        index.add_point(&row.security, parse_date(&row.date, line)?, row.accumulated);
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_read_curves_groups_by_security() {
        let data = "\
date,security,accumulated
2024-01-01,ACME,0.0
2024-01-01,GLOBEX,0.0
2024-02-01,ACME,0.05
";
        let index = read_curves(data.as_bytes()).unwrap();
        let acme = index.curve("ACME").unwrap();
        assert_eq!(acme.len(), 2);
        assert_eq!(acme[1], (NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 0.05));
        assert_eq!(index.curve("GLOBEX").unwrap().len(), 1);
    }

    #[test]
    fn test_non_numeric_return_fails() {
        let data = "date,security,accumulated\n2024-01-01,ACME,abc\n";
        assert!(read_curves(data.as_bytes()).is_err());
    }
}
