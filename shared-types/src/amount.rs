use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use ts_rs::TS;

/// Monthly amount in euros.
///
/// Form inputs arrive as free text (`"12,5"`, `""`, `"1200"`) or as numbers,
/// so decoding is lenient: anything that does not parse counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, TS)]
pub struct Amount(pub f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Parse a user-typed amount. Accepts `,` as decimal separator.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.replacen(',', ".", 1).parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Amount(v)
        } else {
            Amount::ZERO
        }
    }
}

impl From<&str> for Amount {
    fn from(raw: &str) -> Self {
        Amount(parse_amount(raw))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawAmount>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawAmount::Number(v)) => Amount::from(v),
            Some(RawAmount::Text(s)) => Amount::from(s.as_str()),
            Some(RawAmount::Other(_)) | None => Amount::ZERO,
        })
    }
}
