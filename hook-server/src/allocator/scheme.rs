//! Identifier generation rules

use rand::Rng;
use shared::models::IdScheme;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random suffix length for the random scheme
pub const RANDOM_SUFFIX_LEN: usize = 4;

/// Rendered width of the sequential ordinal; wider values still render in full
pub const ORDINAL_WIDTH: usize = 3;

/// Largest ordinal that fits [`ORDINAL_WIDTH`]
pub const MAX_ORDINAL_IN_WIDTH: u64 = 999;

/// Where sequential ordinals come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSource {
    /// `1 + count of records in the day bucket`, probing forward on collision
    CountQuery,
    /// Atomic per-bucket counter in the store
    AtomicCounter,
}

/// Generation rule plus its fixed prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheme {
    /// `prefix + BASE36(millis) + 4 random BASE36 chars`
    Random { prefix: String },
    /// `prefix + YYYYMMDD + ordinal (3 digits, zero padded)`
    Sequential {
        prefix: String,
        source: SequenceSource,
    },
}

impl Scheme {
    pub fn random(prefix: impl Into<String>) -> Self {
        Scheme::Random {
            prefix: prefix.into(),
        }
    }

    pub fn sequential(prefix: impl Into<String>, source: SequenceSource) -> Self {
        Scheme::Sequential {
            prefix: prefix.into(),
            source,
        }
    }

    pub fn kind(&self) -> IdScheme {
        match self {
            Scheme::Random { .. } => IdScheme::Random,
            Scheme::Sequential { .. } => IdScheme::Sequential,
        }
    }

    pub fn prefix(&self) -> &str {
        match self {
            Scheme::Random { prefix } | Scheme::Sequential { prefix, .. } => prefix,
        }
    }
}

/// Uppercase base-36 rendering of a non-negative integer
pub fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    // BASE36 is ASCII
    buf.into_iter().map(char::from).collect()
}

/// Random-scheme candidate for the given wall-clock millis
pub fn random_candidate(prefix: &str, now_millis: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect();
    format!("{}{}{}", prefix, to_base36(now_millis.max(0) as u64), suffix)
}

/// Sequential-scheme candidate; ordinals above 999 render wider, never truncated
pub fn sequential_candidate(prefix: &str, bucket_key: &str, ordinal: u64) -> String {
    format!(
        "{}{}{:0width$}",
        prefix,
        bucket_key,
        ordinal,
        width = ORDINAL_WIDTH
    )
}

/// Does `value` look like a random-scheme identifier with this prefix?
pub fn is_random_shaped(prefix: &str, value: &str) -> bool {
    let Some(rest) = value.strip_prefix(prefix) else {
        return false;
    };
    rest.len() > RANDOM_SUFFIX_LEN
        && rest
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}
