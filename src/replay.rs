//! Line-based report recordings
//!
//! One report per line, the same format [`DeviceReport`]'s `Display` writes:
//!
//! ```text
//! # comment
//! tablet <x> <y> [pressure]
//! aux <button-mask>
//! proximity <near|far>
//! ```
//!
//! Button masks accept decimal or `0x`-prefixed hex.

use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::report::{AuxReport, DeviceReport, ProximityReport, TabletReport};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReplayError {
    #[error("line {line}: unknown report kind '{kind}'")]
    UnknownKind { line: usize, kind: String },

    #[error("line {line}: missing field '{field}'")]
    MissingField { line: usize, field: &'static str },

    #[error("line {line}: invalid value '{value}' for '{field}'")]
    InvalidValue {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: unexpected trailing input '{rest}'")]
    TrailingInput { line: usize, rest: String },
}

struct Fields<'a> {
    line: usize,
    tokens: std::str::SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    fn required(&mut self, field: &'static str) -> Result<&'a str, ReplayError> {
        self.tokens.next().ok_or(ReplayError::MissingField {
            line: self.line,
            field,
        })
    }

    fn parse<T: std::str::FromStr>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<T, ReplayError> {
        value.parse().map_err(|_| ReplayError::InvalidValue {
            line: self.line,
            field,
            value: value.to_string(),
        })
    }

    fn finish(self) -> Result<(), ReplayError> {
        let rest: Vec<&str> = self.tokens.collect();
        if rest.is_empty() {
            Ok(())
        } else {
            Err(ReplayError::TrailingInput {
                line: self.line,
                rest: rest.join(" "),
            })
        }
    }
}

fn parse_mask(fields: &Fields<'_>, value: &str) -> Result<u32, ReplayError> {
    match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| ReplayError::InvalidValue {
            line: fields.line,
            field: "buttons",
            value: value.to_string(),
        }),
        None => fields.parse("buttons", value),
    }
}

/// Parses one line; `Ok(None)` for blank and comment lines
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<DeviceReport>, ReplayError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut fields = Fields {
        line: line_number,
        tokens: trimmed.split_whitespace(),
    };
    let kind = fields.required("kind")?;

    let report = match kind {
        "tablet" => {
            let x = fields.required("x")?;
            let x: f32 = fields.parse("x", x)?;
            let y = fields.required("y")?;
            let y: f32 = fields.parse("y", y)?;
            let pressure = match fields.tokens.next() {
                Some(value) => fields.parse("pressure", value)?,
                None => 0,
            };
            DeviceReport::from(TabletReport::new(x, y, pressure))
        }
        "aux" => {
            let mask = fields.required("buttons")?;
            DeviceReport::from(AuxReport::new(parse_mask(&fields, mask)?))
        }
        "proximity" => {
            let state = fields.required("state")?;
            let near = match state {
                "near" => true,
                "far" => false,
                other => {
                    return Err(ReplayError::InvalidValue {
                        line: line_number,
                        field: "state",
                        value: other.to_string(),
                    })
                }
            };
            DeviceReport::from(ProximityReport::new(near))
        }
        other => {
            return Err(ReplayError::UnknownKind {
                line: line_number,
                kind: other.to_string(),
            })
        }
    };

    fields.finish()?;
    Ok(Some(report))
}

/// Feeds a recording into a report channel, one report per `interval`
///
/// Unparsable lines are logged and skipped. Returns the number of reports
/// sent; the sender is dropped on return so the receiving pipeline can drain
/// and finish.
pub async fn replay_reports<R>(
    reader: R,
    sender: mpsc::Sender<DeviceReport>,
    interval: Duration,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_number = 0;
    let mut sent = 0;
    // zero interval replays as fast as the channel accepts
    let mut pacing = (!interval.is_zero()).then(|| tokio::time::interval(interval));

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        match parse_line(&line, line_number) {
            Ok(Some(report)) => {
                if let Some(pacing) = pacing.as_mut() {
                    pacing.tick().await;
                }
                if sender.send(report).await.is_err() {
                    error!("Filter pipeline stopped accepting reports");
                    break;
                }
                sent += 1;
            }
            Ok(None) => {}
            Err(e) => warn!("Skipping report: {}", e),
        }
    }

    debug!("Replayed {} reports from {} lines", sent, line_number);
    Ok(sent)
}
