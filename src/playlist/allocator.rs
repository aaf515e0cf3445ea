use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Weight that asks for the whole playlist (the slider scale is 0-100)
pub const MAX_WEIGHT: f64 = 100.0;

/// Reasons a set of mood weights cannot be allocated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("mood weights must be a JSON object mapping mood names to numbers")]
    NotAnObject,
    #[error("at least one mood weight is required")]
    NoMoods,
    #[error("mood names must not be empty")]
    EmptyMoodName,
    #[error("weight for mood '{0}' must be a number")]
    NotANumber(String),
    #[error("weight for mood '{mood}' must be a finite number, got {weight}")]
    NotFinite { mood: String, weight: f64 },
    #[error("mood '{0}' appears more than once")]
    DuplicateMood(String),
}

/// Ordered mood name -> weight mapping. Order matters: it breaks remainder ties.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodWeights {
    entries: Vec<(String, f64)>,
}

impl MoodWeights {
    /// Validate and build weights, keeping the given order
    pub fn new<I, S>(entries: I) -> Result<Self, AllocationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut validated: Vec<(String, f64)> = Vec::new();

        for (mood, weight) in entries {
            let mood: String = mood.into();
            let mood = mood.trim().to_string();
            if mood.is_empty() {
                return Err(AllocationError::EmptyMoodName);
            }
            if !weight.is_finite() {
                return Err(AllocationError::NotFinite { mood, weight });
            }
            // Same folding as the mood folder lookup
            let folded = mood.to_lowercase();
            if validated
                .iter()
                .any(|(existing, _)| existing.to_lowercase() == folded)
            {
                return Err(AllocationError::DuplicateMood(mood));
            }
            validated.push((mood, weight));
        }

        if validated.is_empty() {
            return Err(AllocationError::NoMoods);
        }

        Ok(Self { entries: validated })
    }

    /// Build weights from trusted, distinct mood names, forcing every value
    /// into `0..=MAX_WEIGHT` (non-finite values become 0)
    pub fn clamped<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(mood, weight)| {
                let weight = if weight.is_finite() {
                    weight.clamp(0.0, MAX_WEIGHT)
                } else {
                    0.0
                };
                (mood.into(), weight)
            })
            .collect();
        Self { entries }
    }

    /// A playlist made entirely of one mood
    pub fn single(mood: &str) -> Result<Self, AllocationError> {
        Self::new([(mood, MAX_WEIGHT)])
    }

    /// Parse a JSON object such as `{"Happy": 60, "Chill": 40}`
    pub fn from_json(value: &Value) -> Result<Self, AllocationError> {
        let object = value.as_object().ok_or(AllocationError::NotAnObject)?;

        let mut entries = Vec::with_capacity(object.len());
        for (mood, weight) in object {
            let weight = weight
                .as_f64()
                .ok_or_else(|| AllocationError::NotANumber(mood.clone()))?;
            entries.push((mood.as_str(), weight));
        }

        Self::new(entries)
    }

    pub fn get(&self, mood: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == mood)
            .map(|(_, weight)| *weight)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(mood, weight)| (mood.as_str(), *weight))
    }

}

impl Serialize for MoodWeights {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (mood, weight) in &self.entries {
            // Whole weights go out as integers: `60`, not `60.0`
            if weight.fract() == 0.0 && weight.abs() < i64::MAX as f64 {
                map.serialize_entry(mood, &(*weight as i64))?;
            } else {
                map.serialize_entry(mood, weight)?;
            }
        }
        map.end()
    }
}

/// Number of tracks to draw from each mood bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    counts: Vec<(String, usize)>,
}

impl Allocation {
    pub fn get(&self, mood: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(name, _)| name == mood)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(mood, count)| (mood.as_str(), *count))
    }

    /// Moods that actually contribute tracks, in input order
    pub fn non_zero(&self) -> impl Iterator<Item = (&str, usize)> {
        self.iter().filter(|(_, count)| *count > 0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// True when nothing was allocated (all weights zero, or a zero total)
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Serialize for Allocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (mood, count) in &self.counts {
            map.serialize_entry(mood, count)?;
        }
        map.end()
    }
}

/// Share of `total` a weight asks for, reading the weight as a percentage
/// of a 100 basis (weights are not renormalized by their sum)
pub fn exact_share(weight: f64, total: usize) -> f64 {
    weight * total as f64 / 100.0
}

struct Share {
    index: usize,
    remainder: f64,
}

/// Split `total` tracks across moods with the largest-remainder method.
///
/// Each positive weight gets `floor(exact_share)`; the slots left over go one
/// at a time to the moods with the largest fractional remainder, ties going
/// to the mood listed first. Moods with weight <= 0 always get 0.
///
/// When the positive weights do not add up to 100 the floors can fall short
/// by more than one slot per mood or overshoot `total`. Leftover slots then
/// keep cycling through the same order, and surplus slots are taken back in
/// the reverse order, so the counts always sum to `total` unless every
/// weight is zero.
pub fn allocate(weights: &MoodWeights, total: usize) -> Allocation {
    let mut counts: Vec<(String, usize)> = weights
        .iter()
        .map(|(mood, _)| (mood.to_string(), 0))
        .collect();

    let mut shares: Vec<Share> = Vec::new();
    for (index, (_, weight)) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        let exact = exact_share(weight, total);
        let floor = exact.floor();
        counts[index].1 = floor as usize;
        shares.push(Share {
            index,
            remainder: exact - floor,
        });
    }

    if shares.is_empty() {
        return Allocation { counts };
    }

    shares.sort_by(|a, b| {
        b.remainder
            .total_cmp(&a.remainder)
            .then_with(|| a.index.cmp(&b.index))
    });
    let order: Vec<usize> = shares.iter().map(|share| share.index).collect();

    let assigned: usize = counts.iter().map(|(_, count)| count).sum();
    if assigned < total {
        let mut missing = total - assigned;
        for &index in order.iter().cycle() {
            if missing == 0 {
                break;
            }
            counts[index].1 += 1;
            missing -= 1;
        }
    } else if assigned > total {
        let mut surplus = assigned - total;
        for &index in order.iter().rev().cycle() {
            if surplus == 0 {
                break;
            }
            if counts[index].1 > 0 {
                counts[index].1 -= 1;
                surplus -= 1;
            }
        }
    }

    Allocation { counts }
}
