//! The delimited text encoding shared by requests and responses: records are separated by `;`
//! and the numeric fields of a record by `,`.

use std::{
    error::Error,
    fmt::{self, Display},
    num::ParseFloatError,
    str::FromStr,
};

pub const RECORD_DELIMITER: char = ';';
pub const FIELD_DELIMITER: char = ',';

/// Failures while decoding delimited records.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordsErr {
    EmptyRecord {
        record: usize,
    },
    InvalidField {
        record: usize,
        field: usize,
        token: String,
        source: ParseFloatError,
    },
    UnknownMarker {
        marker: String,
    },
}

impl Display for RecordsErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordsErr::EmptyRecord { record } => write!(f, "record {record} is empty"),
            RecordsErr::InvalidField {
                record,
                field,
                token,
                source,
            } => write!(
                f,
                "field {field} of record {record} is not a number ({token:?}): {source}"
            ),
            RecordsErr::UnknownMarker { marker } => write!(f, "unknown message marker {marker:?}"),
        }
    }
}

impl Error for RecordsErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecordsErr::InvalidField { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// An ordered list of numeric records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records(Vec<Vec<f32>>);

impl Records {
    /// Creates a new `Records` out of its rows.
    ///
    /// # Arguments
    /// * `rows` - The numeric fields of every record.
    pub fn new<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<f32>>,
    {
        Self(rows.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[f32]> {
        self.0.iter().map(Vec::as_slice)
    }

    pub fn into_inner(self) -> Vec<Vec<f32>> {
        self.0
    }
}

/// Parses the `,` separated numeric fields of a single record.
///
/// # Arguments
/// * `record` - The raw record text.
/// * `index` - The position of the record, used for error reporting.
///
/// # Returns
/// The parsed fields or the first field that failed to parse.
pub fn parse_fields(record: &str, index: usize) -> Result<Vec<f32>, RecordsErr> {
    if record.trim().is_empty() {
        return Err(RecordsErr::EmptyRecord { record: index });
    }

    record
        .split(FIELD_DELIMITER)
        .enumerate()
        .map(|(field, token)| {
            token
                .trim()
                .parse::<f32>()
                .map_err(|source| RecordsErr::InvalidField {
                    record: index,
                    field,
                    token: token.to_string(),
                    source,
                })
        })
        .collect()
}

/// Writes `fields` as a single `,` separated record.
pub(crate) fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[f32]) -> fmt::Result {
    for (i, x) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, "{FIELD_DELIMITER}")?;
        }
        write!(f, "{x}")?;
    }

    Ok(())
}

impl FromStr for Records {
    type Err = RecordsErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(RECORD_DELIMITER)
            .enumerate()
            .map(|(i, record)| parse_fields(record, i))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl Display for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, record) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{RECORD_DELIMITER}")?;
            }
            write_fields(f, record)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_and_fields() {
        let records: Records = "0.5,1.2,2.0,3.1;-1,2".parse().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records.into_inner(), vec![vec![0.5, 1.2, 2.0, 3.1], vec![-1.0, 2.0]]);
    }

    #[test]
    fn tolerates_whitespace_around_fields() {
        let records: Records = " 1 , 2 ;3,4 ".parse().unwrap();
        assert_eq!(records.into_inner(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn malformed_field_is_reported_not_zeroed() {
        let err = "1,2;3,abc".parse::<Records>().unwrap_err();

        match err {
            RecordsErr::InvalidField {
                record,
                field,
                token,
                ..
            } => {
                assert_eq!(record, 1);
                assert_eq!(field, 1);
                assert_eq!(token, "abc");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn trailing_delimiter_is_an_empty_record() {
        let err = "1,2;".parse::<Records>().unwrap_err();
        assert_eq!(err, RecordsErr::EmptyRecord { record: 1 });
    }

    #[test]
    fn displays_with_delimiters() {
        let records = Records::new([vec![1.5, -2.0], vec![0.25]]);
        assert_eq!(records.to_string(), "1.5,-2;0.25");
    }
}
