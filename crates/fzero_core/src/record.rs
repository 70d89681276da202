use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bits::{from_bcd, pack, to_bcd, unpack};
use crate::core_api::CoreError;
use crate::time::Time;

pub const RECORD_SIZE: usize = 3;

// Lowest bits first: cents, seconds, minutes, vehicle, mode, displayed.
const FIELD_WIDTHS: [u32; 6] = [8, 8, 4, 2, 1, 1];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Vehicle {
    #[default]
    BlueFalcon,
    WildGoose,
    GoldenFox,
    FireStingray,
}

impl Vehicle {
    /// Wire ordinal to variant. Two bits cover exactly these four.
    pub const ALL: [Vehicle; 4] = [
        Self::BlueFalcon,
        Self::WildGoose,
        Self::GoldenFox,
        Self::FireStingray,
    ];

    pub fn from_raw(raw: u8) -> Self {
        Self::ALL[usize::from(raw & 0b11)]
    }

    pub fn raw(&self) -> u8 {
        match *self {
            Self::BlueFalcon => 0,
            Self::WildGoose => 1,
            Self::GoldenFox => 2,
            Self::FireStingray => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::BlueFalcon => "Blue Falcon",
            Self::WildGoose => "Wild Goose",
            Self::GoldenFox => "Golden Fox",
            Self::FireStingray => "Fire Stingray",
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    GrandPrix,
    Practice,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Self::GrandPrix, Self::Practice];

    pub fn from_raw(raw: u8) -> Self {
        Self::ALL[usize::from(raw & 0b1)]
    }

    pub fn raw(&self) -> u8 {
        match *self {
            Self::GrandPrix => 0,
            Self::Practice => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::GrandPrix => "Grand Prix",
            Self::Practice => "Practice",
        }
    }

    /// Single-column marker used in the text report.
    pub fn marker(&self) -> char {
        match *self {
            Self::GrandPrix => ' ',
            Self::Practice => '*',
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored race or lap result.
///
/// Hidden records (`displayed == false`) are empty slots; the game fills them
/// with 9:59.99 in a Blue Falcon, Grand Prix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub time: Time,
    pub vehicle: Vehicle,
    pub mode: Mode,
    pub displayed: bool,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            time: Time::BLANK,
            vehicle: Vehicle::BlueFalcon,
            mode: Mode::GrandPrix,
            displayed: false,
        }
    }
}

impl Record {
    pub fn new(time: Time, vehicle: Vehicle, mode: Mode) -> Self {
        Self {
            time,
            vehicle,
            mode,
            displayed: true,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, CoreError> {
        if data.len() != RECORD_SIZE {
            return Err(CoreError::parse(format!(
                "record must be {RECORD_SIZE} bytes, got {}",
                data.len()
            )));
        }

        let fields = unpack(data, &FIELD_WIDTHS);
        let digit = |raw: u64, name: &str| {
            from_bcd(raw)
                .map(|v| v as u8)
                .ok_or_else(|| CoreError::parse(format!("{name} 0x{raw:02X} is not BCD")))
        };

        Ok(Self {
            time: Time {
                cents: digit(fields[0], "centiseconds")?,
                seconds: digit(fields[1], "seconds")?,
                minutes: digit(fields[2], "minutes")?,
            },
            vehicle: Vehicle::from_raw(fields[3] as u8),
            mode: Mode::from_raw(fields[4] as u8),
            displayed: fields[5] == 1,
        })
    }

    /// Decodes `data`, substituting the blank record when it is malformed.
    ///
    /// The error that caused the substitution is returned alongside so table
    /// decoders can report where it happened.
    pub fn decode_or_default(data: &[u8]) -> (Self, Option<CoreError>) {
        match Self::decode(data) {
            Ok(record) => (record, None),
            Err(e) => {
                warn!("malformed record [{}]: {}", hex(data), e.message);
                (Self::default(), Some(e))
            }
        }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let packed = pack(&[
            (to_bcd(u64::from(self.time.cents)), FIELD_WIDTHS[0]),
            (to_bcd(u64::from(self.time.seconds)), FIELD_WIDTHS[1]),
            (to_bcd(u64::from(self.time.minutes)), FIELD_WIDTHS[2]),
            (u64::from(self.vehicle.raw()), FIELD_WIDTHS[3]),
            (u64::from(self.mode.raw()), FIELD_WIDTHS[4]),
            (u64::from(self.displayed), FIELD_WIDTHS[5]),
        ]);
        let mut out = [0u8; RECORD_SIZE];
        out.copy_from_slice(&packed);
        out
    }

    /// Report form: `-` for hidden records, else time, mode marker and vehicle.
    pub fn pretty(&self) -> String {
        if !self.displayed {
            return "-".to_string();
        }
        format!("{} {} {}", self.time.pretty(), self.mode.marker(), self.vehicle)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.displayed {
            f.write_str("* ")?;
        }
        write!(f, "{} {} {}", self.time, self.mode, self.vehicle)
    }
}

pub(crate) fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}
