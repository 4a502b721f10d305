use comms::{Msg, Records};

use crate::{Result, TrainerErr};

/// The samples received in one round: the training pairs followed by the query whose prediction
/// is sent back for visualization.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    inputs: Vec<Vec<f32>>,
    targets: Vec<Vec<f32>>,
    query: Vec<f32>,
}

impl Batch {
    /// Splits decoded records into a batch.
    ///
    /// Every record but the last must hold exactly `input_dim + output_dim` fields, the first
    /// `input_dim` of them being the input. The last record is the query and may carry only its
    /// input or a whole sample.
    ///
    /// # Arguments
    /// * `records` - The decoded response.
    /// * `input_dim` - The width of the input vectors.
    /// * `output_dim` - The width of the target vectors.
    pub fn from_records(records: Records, input_dim: usize, output_dim: usize) -> Result<Self> {
        let sample_len = input_dim + output_dim;
        let nrecords = records.len();
        let mut rows = records.into_inner();

        let Some(mut query) = rows.pop() else {
            return Err(TrainerErr::FieldCount {
                record: 0,
                got: 0,
                expected: input_dim,
            });
        };

        if query.len() != input_dim && query.len() != sample_len {
            return Err(TrainerErr::FieldCount {
                record: nrecords - 1,
                got: query.len(),
                expected: input_dim,
            });
        }
        query.truncate(input_dim);

        let mut inputs = Vec::with_capacity(rows.len());
        let mut targets = Vec::with_capacity(rows.len());

        for (record, mut fields) in rows.into_iter().enumerate() {
            if fields.len() != sample_len {
                return Err(TrainerErr::FieldCount {
                    record,
                    got: fields.len(),
                    expected: sample_len,
                });
            }

            targets.push(fields.split_off(input_dim));
            inputs.push(fields);
        }

        Ok(Self {
            inputs,
            targets,
            query,
        })
    }

    /// Whether the simulator only asked for a prediction, sending no training samples.
    pub fn is_prediction_only(&self) -> bool {
        self.inputs.is_empty()
    }

    /// The amount of training samples.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[Vec<f32>] {
        &self.inputs
    }

    pub fn targets(&self) -> &[Vec<f32>] {
        &self.targets
    }

    pub fn query(&self) -> &[f32] {
        &self.query
    }
}

/// Parses a simulator response into a `Batch`.
///
/// # Arguments
/// * `response` - The response text, `;` separated records of `,` separated numbers.
/// * `input_dim` - The width of the input vectors.
/// * `output_dim` - The width of the target vectors.
///
/// # Returns
/// The batch, or the first problem found in the response. Nothing is coerced: a field that is
/// not a number fails the whole response.
pub fn parse_batch(response: &str, input_dim: usize, output_dim: usize) -> Result<Batch> {
    match Msg::parse(response)? {
        Msg::Records(records) => Batch::from_records(records, input_dim, output_dim),
        other => Err(TrainerErr::UnexpectedMessage {
            got: other.marker().unwrap_or("records"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use comms::RecordsErr;

    use super::*;

    #[test]
    fn splits_records_in_halves() {
        let batch = parse_batch("0.5,1.2,2.0,3.1;1,1,0,0;0.25,0.75", 2, 2).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.inputs(), [vec![0.5, 1.2], vec![1., 1.]]);
        assert_eq!(batch.targets(), [vec![2.0, 3.1], vec![0., 0.]]);
        assert_eq!(batch.query(), [0.25, 0.75]);
        assert!(!batch.is_prediction_only());
    }

    #[test]
    fn single_record_is_prediction_only() {
        let batch = parse_batch("0.25,0.75", 2, 2).unwrap();

        assert!(batch.is_prediction_only());
        assert_eq!(batch.query(), [0.25, 0.75]);
    }

    #[test]
    fn full_query_record_keeps_only_its_input() {
        let batch = parse_batch("1,2,3,4;5,6,7,8", 2, 2).unwrap();
        assert_eq!(batch.query(), [5., 6.]);
    }

    #[test]
    fn wide_samples() {
        let record: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let query: Vec<String> = (0..10).map(|i| (i * 2).to_string()).collect();
        let response = format!("{};{}", record.join(","), query.join(","));

        let batch = parse_batch(&response, 10, 10).unwrap();

        assert_eq!(batch.inputs()[0], (0..10).map(|i| i as f32).collect::<Vec<_>>());
        assert_eq!(batch.targets()[0], (10..20).map(|i| i as f32).collect::<Vec<_>>());
        assert_eq!(batch.query().len(), 10);
    }

    #[test]
    fn malformed_field_is_surfaced() {
        let err = parse_batch("0.5,1.2,oops,3.1;0,0", 2, 2).unwrap_err();
        assert!(matches!(
            err,
            TrainerErr::Malformed(RecordsErr::InvalidField { record: 0, field: 2, .. })
        ));
    }

    #[test]
    fn wrong_field_count() {
        let err = parse_batch("1,2,3;0,0", 2, 2).unwrap_err();
        assert!(matches!(
            err,
            TrainerErr::FieldCount {
                record: 0,
                got: 3,
                expected: 4
            }
        ));

        let err = parse_batch("1,2,3,4;0,0,0", 2, 2).unwrap_err();
        assert!(matches!(
            err,
            TrainerErr::FieldCount {
                record: 1,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn request_echo_is_unexpected() {
        let err = parse_batch("s 1,2", 2, 2).unwrap_err();
        assert!(matches!(err, TrainerErr::UnexpectedMessage { got: "s" }));
    }
}
