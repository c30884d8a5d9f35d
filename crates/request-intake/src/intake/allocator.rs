use std::collections::{BTreeSet, HashSet};

use rand::Rng;
use tracing::warn;

use super::domain::{RequestId, VolunteerRole};

const NUMERIC_WIDTH: usize = 5;
const MAX_NUMERIC: u32 = 99_999;
const RANDOM_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const EXHAUSTED_SUFFIX: &str = "XXXXX";

pub const DEFAULT_RANDOM_ATTEMPTS: u32 = 10_000;

/// Id prefix for a role. The unmapped role gets a bare `REQ`, without the `REQ-` separator
/// the mapped roles carry.
pub fn prefix_for(role: VolunteerRole) -> &'static str {
    match role {
        VolunteerRole::AshramVolunteer => "REQ-AV",
        VolunteerRole::ShortTermSupport => "REQ-STV",
        VolunteerRole::LongTermSupport => "REQ-LTV",
        VolunteerRole::Other => "REQ",
    }
}

/// How an id was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationKind {
    Sequential,
    Random,
    /// Every attempt collided; the id is the `XXXXX` sentinel and may not be unique.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub id: RequestId,
    pub kind: AllocationKind,
}

/// Issues role-prefixed ids against the set of ids known at session start.
///
/// Uniqueness holds against that snapshot plus ids reserved through [`reserve`]; ids
/// issued by other sessions after the snapshot are invisible here.
///
/// [`reserve`]: RequestIdAllocator::reserve
#[derive(Debug, Clone)]
pub struct RequestIdAllocator {
    existing: HashSet<String>,
    random_attempts: u32,
}

impl RequestIdAllocator {
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            existing: existing.into_iter().map(Into::into).collect(),
            random_attempts: DEFAULT_RANDOM_ATTEMPTS,
        }
    }

    pub fn with_random_attempts(mut self, attempts: u32) -> Self {
        self.random_attempts = attempts;
        self
    }

    pub fn known_ids(&self) -> usize {
        self.existing.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.existing.contains(id)
    }

    /// Record an id as used so later allocations in this session skip it.
    pub fn reserve(&mut self, id: &RequestId) {
        self.existing.insert(id.0.clone());
    }

    pub fn allocate(&self, role: VolunteerRole) -> Allocation {
        self.allocate_with(role, &mut rand::thread_rng())
    }

    /// Lowest free number first; random suffixes once the numeric space is full.
    pub fn allocate_with<R: Rng>(&self, role: VolunteerRole, rng: &mut R) -> Allocation {
        let prefix = prefix_for(role);

        if let Some(number) = self.first_free_number(prefix) {
            return Allocation {
                id: RequestId(format!("{prefix}{number:0width$}", width = NUMERIC_WIDTH)),
                kind: AllocationKind::Sequential,
            };
        }

        for _ in 0..self.random_attempts {
            let suffix: String = (0..NUMERIC_WIDTH)
                .map(|_| RANDOM_ALPHABET[rng.gen_range(0..RANDOM_ALPHABET.len())] as char)
                .collect();
            let candidate = format!("{prefix}{suffix}");
            if !self.existing.contains(&candidate) {
                return Allocation {
                    id: RequestId(candidate),
                    kind: AllocationKind::Random,
                };
            }
        }

        warn!(
            prefix,
            attempts = self.random_attempts,
            "request id space exhausted; issuing sentinel id"
        );
        Allocation {
            id: RequestId(format!("{prefix}{EXHAUSTED_SUFFIX}")),
            kind: AllocationKind::Exhausted,
        }
    }

    fn first_free_number(&self, prefix: &str) -> Option<u32> {
        let used: BTreeSet<u32> = self
            .existing
            .iter()
            .filter_map(|id| id.strip_prefix(prefix))
            .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .collect();

        (1..=MAX_NUMERIC).find(|number| !used.contains(number))
    }
}
