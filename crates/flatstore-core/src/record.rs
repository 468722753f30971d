//! The `Record` row type and its flat-file line codec.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ParseError;

/// Field separator used in the backing file
pub const DELIMITER: char = ',';

/// Number of fields on every line
pub const FIELD_COUNT: usize = 4;

/// One row of the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub age: i64,
    pub city: String,
    pub balance: f64,
}

impl Record {
    pub fn new(name: impl Into<String>, age: i64, city: impl Into<String>, balance: f64) -> Self {
        Self {
            name: name.into(),
            age,
            city: city.into(),
            balance,
        }
    }

    /// Decode one line of the backing file.
    ///
    /// Fields are trimmed. `line_no` is only used for error reporting.
    pub fn parse_line(line_no: usize, line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount {
                line: line_no,
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let age = fields[1].parse::<i64>().map_err(|_| ParseError::InvalidAge {
            line: line_no,
            value: fields[1].to_string(),
        })?;
        let balance = fields[3]
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidBalance {
                line: line_no,
                value: fields[3].to_string(),
            })?;

        Ok(Self {
            name: fields[0].to_string(),
            age,
            city: fields[2].to_string(),
            balance,
        })
    }

    /// Encode as a line of the backing file, without the trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{}{d}{}{d}{}{d}{}",
            self.name,
            self.age,
            self.city,
            format_balance(self.balance),
            d = DELIMITER
        )
    }

    /// True if a text field contains the delimiter and would not survive a reload
    pub fn has_delimiter(&self) -> bool {
        self.name.contains(DELIMITER) || self.city.contains(DELIMITER)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

// Integral balances keep a ".0" so files read `1500.0`, not `1500`.
fn format_balance(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
