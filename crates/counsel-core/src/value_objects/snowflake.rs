//! Snowflake ID - 64-bit time-ordered identifier
//!
//! Layout (most significant first):
//! - 41 bits: milliseconds since [`Snowflake::EPOCH`]
//! - 10 bits: worker id
//! - 12 bits: per-millisecond sequence
//!
//! Ids from one generator are strictly increasing, which is what orders a
//! consultation's message thread.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const WORKER_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const WORKER_MASK: i64 = (1 << WORKER_BITS) - 1;
const TIMESTAMP_SHIFT: u32 = WORKER_BITS + SEQUENCE_BITS;

/// Time-ordered 64-bit identifier for consultations, messages and users
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Custom epoch: 2025-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_735_689_600_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the id
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> TIMESTAMP_SHIFT) + Self::EPOCH
    }

    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & WORKER_MASK) as u16
    }

    #[inline]
    pub fn sequence(&self) -> u16 {
        (self.0 & SEQUENCE_MASK) as u16
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .ok()
            .filter(|v| *v >= 0)
            .map(Snowflake)
            .ok_or(SnowflakeParseError::InvalidFormat)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Ids travel as JSON strings: they exceed the 53-bit integer range of JS clients
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(v) => Ok(Snowflake(v)),
            Repr::Str(s) => Snowflake::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Lock-free Snowflake generator.
///
/// The last issued `(millis, sequence)` pair is packed into one atomic so a
/// single compare-and-swap both reserves a sequence number and advances the
/// clock. When the wall clock stalls or steps backwards the generator keeps
/// counting from its last issued millisecond instead of sleeping.
pub struct SnowflakeGenerator {
    worker_id: i64,
    // (millis since EPOCH) << SEQUENCE_BITS | sequence
    last: AtomicI64,
}

impl SnowflakeGenerator {
    /// Only the low 10 bits of `worker_id` are used.
    pub fn new(worker_id: u16) -> Self {
        Self {
            worker_id: i64::from(worker_id) & WORKER_MASK,
            last: AtomicI64::new(0),
        }
    }

    pub fn generate(&self) -> Snowflake {
        let mut prev = self.last.load(Ordering::Acquire);
        loop {
            let now = Self::millis_since_epoch();
            let prev_millis = prev >> SEQUENCE_BITS;

            let next = if now > prev_millis {
                now << SEQUENCE_BITS
            } else if prev & SEQUENCE_MASK < SEQUENCE_MASK {
                prev + 1
            } else {
                // sequence exhausted: borrow the next millisecond
                (prev_millis + 1) << SEQUENCE_BITS
            };

            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let millis = next >> SEQUENCE_BITS;
                    let sequence = next & SEQUENCE_MASK;
                    return Snowflake::new(
                        (millis << TIMESTAMP_SHIFT) | (self.worker_id << SEQUENCE_BITS) | sequence,
                    );
                }
                Err(actual) => prev = actual,
            }
        }
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id as u16
    }

    #[inline]
    fn millis_since_epoch() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64 - Snowflake::EPOCH)
            .unwrap_or(0)
            .max(0)
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_parse_rejects_garbage_and_negatives() {
        assert_eq!(Snowflake::parse(" 42 ").unwrap(), Snowflake::new(42));
        assert!(Snowflake::parse("abc").is_err());
        assert!(Snowflake::parse("-5").is_err());
    }

    #[test]
    fn test_json_is_string_and_accepts_both_forms() {
        let sf = Snowflake::new(987_654_321_012_345_678);
        assert_eq!(serde_json::to_string(&sf).unwrap(), "\"987654321012345678\"");

        let from_str: Snowflake = serde_json::from_str("\"987654321012345678\"").unwrap();
        let from_num: Snowflake = serde_json::from_str("77").unwrap();
        assert_eq!(from_str, sf);
        assert_eq!(from_num.into_inner(), 77);
        assert!(serde_json::from_str::<Snowflake>("\"x1\"").is_err());
    }

    #[test]
    fn test_generator_is_strictly_increasing() {
        let gen = SnowflakeGenerator::new(3);
        let mut last = Snowflake::default();
        for _ in 0..10_000 {
            let id = gen.generate();
            assert!(id > last);
            assert_eq!(id.worker_id(), 3);
            last = id;
        }
    }

    #[test]
    fn test_worker_id_is_masked() {
        let gen = SnowflakeGenerator::new(1024 + 7);
        assert_eq!(gen.worker_id(), 7);
    }

    #[test]
    fn test_generator_unique_across_threads() {
        let gen = Arc::new(SnowflakeGenerator::new(1));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gen = Arc::clone(&gen);
                thread::spawn(move || (0..2_000).map(|_| gen.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(ids.len(), 16_000);
    }

    #[test]
    fn test_timestamp_roughly_now() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64;
        let id = SnowflakeGenerator::default().generate();
        // sequence borrowing may run ahead of the wall clock by a few ms at most
        assert!(id.timestamp() >= before && id.timestamp() <= before + 1_000);
    }
}
