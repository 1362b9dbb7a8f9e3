//! Serialization and deserialization for card types.
//!
//! Suits and ranks travel as their English names. Ranks are also accepted
//! as face numbers, either quoted ("12") or bare (12).

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cards_types::{Rank, Suit};

impl Serialize for Suit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Suit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Suit>().map_err(de::Error::custom)
    }
}

impl Serialize for Rank {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

struct RankVisitor;

impl<'de> Visitor<'de> for RankVisitor {
    type Value = Rank;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a rank name or a face number between 1 and 13")
    }

    fn visit_str<E>(self, v: &str) -> Result<Rank, E>
    where
        E: de::Error,
    {
        v.parse::<Rank>().map_err(E::custom)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Rank, E>
    where
        E: de::Error,
    {
        u8::try_from(v)
            .ok()
            .and_then(Rank::from_value)
            .ok_or_else(|| E::custom(format!("following argument is not valid: {v}")))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Rank, E>
    where
        E: de::Error,
    {
        match u64::try_from(v) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::custom(format!("following argument is not valid: {v}"))),
        }
    }
}

impl<'de> Deserialize<'de> for Rank {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RankVisitor)
    }
}
