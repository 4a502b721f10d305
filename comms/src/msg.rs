use std::{
    fmt::{self, Display},
    io,
};

use crate::{
    Deserialize, Serialize,
    records::{Records, RecordsErr, parse_fields, write_fields},
};

/// Asks the simulator for a batch of samples.
pub const SAMPLE: &str = "s";
/// Carries a prediction to be visualized.
pub const VISUALIZE: &str = "v";

/// The application layer message exchanged with the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// `s`, optionally followed by the stimulus inputs the simulator should evaluate.
    Sample(Option<Records>),
    /// The simulator's answer: training records followed by the query record.
    Records(Records),
    /// `v` followed by the predicted output vector.
    Visualize(Vec<f32>),
}

impl Msg {
    /// Parses a message out of a frame's text.
    ///
    /// # Arguments
    /// * `text` - The frame payload.
    ///
    /// # Returns
    /// The decoded message or the reason it could not be decoded.
    pub fn parse(text: &str) -> Result<Self, RecordsErr> {
        if text == SAMPLE {
            return Ok(Self::Sample(None));
        }

        match text.split_once(' ') {
            Some((SAMPLE, rest)) => Ok(Self::Sample(Some(rest.parse()?))),
            Some((VISUALIZE, rest)) => Ok(Self::Visualize(parse_fields(rest, 0)?)),
            Some((marker, _)) if marker.chars().all(char::is_alphabetic) => {
                Err(RecordsErr::UnknownMarker {
                    marker: marker.to_string(),
                })
            }
            _ => Ok(Self::Records(text.parse()?)),
        }
    }

    /// Returns the marker that prefixes this message on the wire, if any.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Msg::Sample(_) => Some(SAMPLE),
            Msg::Visualize(_) => Some(VISUALIZE),
            Msg::Records(_) => None,
        }
    }
}

impl Display for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Msg::Sample(None) => write!(f, "{SAMPLE}"),
            Msg::Sample(Some(stimulus)) => write!(f, "{SAMPLE} {stimulus}"),
            Msg::Records(records) => write!(f, "{records}"),
            Msg::Visualize(prediction) => {
                write!(f, "{VISUALIZE} ")?;
                write_fields(f, prediction)
            }
        }
    }
}

impl<'a> Serialize<'a> for Msg {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]> {
        buf.extend_from_slice(self.to_string().as_bytes());
        None
    }
}

impl<'a> Deserialize<'a> for Msg {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self> {
        let text = <&str>::deserialize(buf)?;
        Msg::parse(text).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_reply_round_trips() {
        let text = Msg::Visualize(vec![1.23, 4.56]).to_string();
        assert_eq!(text, "v 1.23,4.56");

        let msg = Msg::parse(&text).unwrap();
        assert_eq!(msg.marker(), Some("v"));

        let Msg::Visualize(prediction) = msg else {
            panic!("expected a visualization, got {msg:?}");
        };
        assert!((prediction[0] - 1.23).abs() < 1e-6);
        assert!((prediction[1] - 4.56).abs() < 1e-6);
    }

    #[test]
    fn bare_sample_request() {
        assert_eq!(Msg::Sample(None).to_string(), "s");
        assert_eq!(Msg::parse("s").unwrap(), Msg::Sample(None));
    }

    #[test]
    fn sample_request_with_stimulus() {
        let stimulus = Records::new([vec![0.5, -1.0], vec![1.75, 0.0]]);
        let text = Msg::Sample(Some(stimulus.clone())).to_string();

        assert_eq!(text, "s 0.5,-1;1.75,0");
        assert_eq!(Msg::parse(&text).unwrap(), Msg::Sample(Some(stimulus)));
    }

    #[test]
    fn unmarked_text_is_a_response() {
        let msg = Msg::parse("1,2,3,4;5,6").unwrap();
        assert_eq!(msg.marker(), None);
        assert_eq!(
            msg,
            Msg::Records(Records::new([vec![1., 2., 3., 4.], vec![5., 6.]]))
        );
    }

    #[test]
    fn unknown_marker_is_rejected() {
        let err = Msg::parse("x 1,2").unwrap_err();
        assert_eq!(
            err,
            RecordsErr::UnknownMarker {
                marker: "x".to_string()
            }
        );
    }
}
