//! Pad controller board protocol.
//!
//! The board behind each pad listens on its serial port for short ASCII
//! commands terminated by `\n` and answers with one line per reply:
//!
//! ```text
//! R\n                 -> sensor_sensitivity|sensor:0;sensitivity: 700;   (x4)
//! 2875\n              -> sensor_sensitivity|sensor:2;sensitivity: 875;
//! D10000\n            -> debounce_time|debounce:10000;
//! X\n                 -> unrecognized_command|code:40;
//! ```
//!
//! The board also emits `sensor_state|...` debug dumps, which may be
//! interleaved with command replies.

use std::fmt;

use serde::Serialize;

/// Number of pressure sensors on one board.
pub const SENSORS_COUNT: u8 = 4;

/// Largest sensitivity the board accepts (four decimal digits).
pub const MAX_SENSITIVITY: u16 = 9_999;

/// Largest debounce time in microseconds (five decimal digits).
pub const MAX_DEBOUNCE_MICROS: u32 = 99_999;

/// Longest command body the board buffers, excluding the newline.
pub const MAX_COMMAND_LEN: usize = 9;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("sensor index {0} is out of range (board has 4 sensors)")]
    SensorOutOfRange(u32),

    #[error("{field} value {value} exceeds maximum {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("unknown reply kind '{0}'")]
    UnknownReply(String),

    #[error("reply '{kind}' is missing field '{field}'")]
    MissingField { kind: String, field: &'static str },

    #[error("reply field '{field}' has non-numeric value '{value}'")]
    InvalidNumber { field: String, value: String },

    #[error("malformed reply line '{0}'")]
    Malformed(String),
}

/// A command understood by the board firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardCommand {
    /// Print the sensitivity of every sensor.
    ReadSensitivities,
    /// Set the pressure threshold of one sensor.
    SetSensitivity { sensor: u8, value: u16 },
    /// Set the minimum time between sensor state changes.
    SetDebounce { micros: u32 },
}

impl BoardCommand {
    /// Build a [`BoardCommand::SetSensitivity`], checking both arguments
    /// against what the firmware can parse.
    pub fn set_sensitivity(sensor: u32, value: u32) -> Result<Self, ProtocolError> {
        if sensor >= u32::from(SENSORS_COUNT) {
            return Err(ProtocolError::SensorOutOfRange(sensor));
        }
        if value > u32::from(MAX_SENSITIVITY) {
            return Err(ProtocolError::ValueOutOfRange {
                field: "sensitivity",
                value,
                max: u32::from(MAX_SENSITIVITY),
            });
        }
        Ok(Self::SetSensitivity {
            sensor: sensor as u8,
            value: value as u16,
        })
    }

    pub fn set_debounce(micros: u32) -> Result<Self, ProtocolError> {
        if micros > MAX_DEBOUNCE_MICROS {
            return Err(ProtocolError::ValueOutOfRange {
                field: "debounce",
                value: micros,
                max: MAX_DEBOUNCE_MICROS,
            });
        }
        Ok(Self::SetDebounce { micros })
    }

    /// Wire form of the command, newline included.
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for BoardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardCommand::ReadSensitivities => f.write_str("R"),
            BoardCommand::SetSensitivity { sensor, value } => write!(f, "{sensor}{value}"),
            BoardCommand::SetDebounce { micros } => write!(f, "D{micros}"),
        }
    }
}

/// One line of board output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoardReply {
    SensorSensitivity {
        sensor: u8,
        sensitivity: u16,
    },
    DebounceTime {
        micros: u32,
    },
    UnrecognizedCommand {
        code: i32,
    },
    SensorState {
        sensor: u8,
        sensitivity: u16,
        raw_value: u16,
        smoothed_value: u16,
        previous_state: bool,
        new_state: bool,
        state_change_time_diff: u64,
    },
}

/// Parse raw board output into replies.
///
/// Blank lines and carriage returns are ignored. If `text` does not end
/// with a newline the last line was cut off by the read limit and is
/// dropped.
pub fn parse_replies(text: &str) -> Result<Vec<BoardReply>, ProtocolError> {
    let complete = match text.rfind('\n') {
        Some(end) => &text[..end],
        None => "",
    };

    complete
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(parse_reply)
        .collect()
}

/// Parse a single reply line (without its terminator).
pub fn parse_reply(line: &str) -> Result<BoardReply, ProtocolError> {
    let (kind, body) = line
        .split_once('|')
        .ok_or_else(|| ProtocolError::Malformed(line.to_string()))?;
    let fields = Fields::parse(kind, body)?;

    match kind {
        "sensor_sensitivity" => Ok(BoardReply::SensorSensitivity {
            sensor: fields.number("sensor")?,
            sensitivity: fields.number("sensitivity")?,
        }),
        "debounce_time" => Ok(BoardReply::DebounceTime {
            micros: fields.number("debounce")?,
        }),
        "unrecognized_command" => Ok(BoardReply::UnrecognizedCommand {
            code: fields.number("code")?,
        }),
        "sensor_state" => Ok(BoardReply::SensorState {
            sensor: fields.number("sensor")?,
            sensitivity: fields.number("sensitivity")?,
            raw_value: fields.number("raw_value")?,
            smoothed_value: fields.number("smoothed_value")?,
            previous_state: fields.flag("previous_state")?,
            new_state: fields.flag("new_state")?,
            state_change_time_diff: fields.number("state_change_time_diff")?,
        }),
        other => Err(ProtocolError::UnknownReply(other.to_string())),
    }
}

/// `key:value` pairs of one reply line.
struct Fields<'a> {
    kind: &'a str,
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Fields<'a> {
    fn parse(kind: &'a str, body: &'a str) -> Result<Self, ProtocolError> {
        let pairs = body
            .split(';')
            .filter(|pair| !pair.trim().is_empty())
            .map(|pair| {
                pair.split_once(':')
                    .map(|(k, v)| (k.trim(), v.trim()))
                    .ok_or_else(|| ProtocolError::Malformed(format!("{kind}|{body}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { kind, pairs })
    }

    fn raw(&self, field: &'static str) -> Result<&'a str, ProtocolError> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, v)| *v)
            .ok_or_else(|| ProtocolError::MissingField {
                kind: self.kind.to_string(),
                field,
            })
    }

    fn number<T: std::str::FromStr>(&self, field: &'static str) -> Result<T, ProtocolError> {
        let value = self.raw(field)?;
        value.parse().map_err(|_| ProtocolError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    fn flag(&self, field: &'static str) -> Result<bool, ProtocolError> {
        Ok(self.number::<u8>(field)? != 0)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn encodes_read_command() {
        assert_eq!(BoardCommand::ReadSensitivities.encode(), "R\n");
    }

    #[test]
    fn encodes_sensitivity_command() {
        let cmd = BoardCommand::set_sensitivity(2, 875).unwrap();
        assert_eq!(cmd.encode(), "2875\n");
    }

    #[test]
    fn encodes_debounce_command() {
        let cmd = BoardCommand::set_debounce(10_000).unwrap();
        assert_eq!(cmd.encode(), "D10000\n");
    }

    #[test]
    fn commands_fit_board_buffer() {
        let longest = [
            BoardCommand::set_sensitivity(3, u32::from(MAX_SENSITIVITY)).unwrap(),
            BoardCommand::set_debounce(MAX_DEBOUNCE_MICROS).unwrap(),
        ];
        for cmd in longest {
            assert!(cmd.to_string().len() <= MAX_COMMAND_LEN, "{cmd} too long");
        }
    }

    #[test]
    fn rejects_sensor_past_last() {
        assert_matches!(
            BoardCommand::set_sensitivity(4, 500),
            Err(ProtocolError::SensorOutOfRange(4))
        );
    }

    #[test]
    fn rejects_five_digit_sensitivity() {
        assert_matches!(
            BoardCommand::set_sensitivity(0, 10_000),
            Err(ProtocolError::ValueOutOfRange { field: "sensitivity", .. })
        );
    }

    #[test]
    fn rejects_six_digit_debounce() {
        assert_matches!(
            BoardCommand::set_debounce(100_000),
            Err(ProtocolError::ValueOutOfRange { field: "debounce", .. })
        );
    }

    #[test]
    fn parses_padded_sensitivity_lines() {
        let text = "sensor_sensitivity|sensor:0;sensitivity: 700;\r\n\
                    sensor_sensitivity|sensor:1;sensitivity: 550;\r\n";
        let replies = parse_replies(text).unwrap();
        assert_eq!(
            replies,
            vec![
                BoardReply::SensorSensitivity { sensor: 0, sensitivity: 700 },
                BoardReply::SensorSensitivity { sensor: 1, sensitivity: 550 },
            ]
        );
    }

    #[test]
    fn parses_debounce_and_unrecognized() {
        let text = "debounce_time|debounce:10000;\nunrecognized_command|code:40;\n";
        let replies = parse_replies(text).unwrap();
        assert_eq!(
            replies,
            vec![
                BoardReply::DebounceTime { micros: 10_000 },
                BoardReply::UnrecognizedCommand { code: 40 },
            ]
        );
    }

    #[test]
    fn parses_interleaved_state_dump() {
        let text = "sensor_state|sensor:3;sensitivity: 925;raw_value:1010;smoothed_value: 990;\
                    previous_state:0;new_state:1;state_change_time_diff:123456\n\
                    sensor_sensitivity|sensor:3;sensitivity: 925;\n";
        let replies = parse_replies(text).unwrap();
        assert_eq!(replies.len(), 2);
        assert_matches!(
            replies[0],
            BoardReply::SensorState {
                sensor: 3,
                raw_value: 1010,
                previous_state: false,
                new_state: true,
                state_change_time_diff: 123_456,
                ..
            }
        );
    }

    #[test]
    fn drops_truncated_last_line() {
        let text = "debounce_time|debounce:10000;\nsensor_sensitivity|sens";
        assert_eq!(
            parse_replies(text).unwrap(),
            vec![BoardReply::DebounceTime { micros: 10_000 }]
        );
    }

    #[test]
    fn empty_output_has_no_replies() {
        assert!(parse_replies("").unwrap().is_empty());
        assert!(parse_replies("\r\n\n").unwrap().is_empty());
    }

    #[test]
    fn unknown_kind_is_an_error() {
        assert_matches!(
            parse_replies("hello|a:1;\n"),
            Err(ProtocolError::UnknownReply(kind)) if kind == "hello"
        );
    }

    #[test]
    fn missing_field_is_an_error() {
        assert_matches!(
            parse_reply("sensor_sensitivity|sensor:1;"),
            Err(ProtocolError::MissingField { field: "sensitivity", .. })
        );
    }

    #[test]
    fn non_numeric_value_is_an_error() {
        assert_matches!(
            parse_reply("debounce_time|debounce:soon;"),
            Err(ProtocolError::InvalidNumber { .. })
        );
    }

    #[test]
    fn line_without_separator_is_malformed() {
        assert_matches!(parse_reply("garbage"), Err(ProtocolError::Malformed(_)));
    }

    #[test]
    fn reply_serializes_with_kind_tag() {
        let json = serde_json::to_value(BoardReply::DebounceTime { micros: 5 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "debounce_time", "micros": 5}));
    }
}
