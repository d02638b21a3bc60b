use crate::domain::model::{Availability, Carpark};
use std::collections::{HashMap, HashSet};

/// Availability snapshots keyed by carpark number.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    by_carpark: HashMap<String, Availability>,
}

/// Outcome of [`AvailabilityIndex::attach`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachSummary {
    pub matched: usize,
    pub unmatched_carparks: Vec<String>,
    /// Indexed carpark numbers that no carpark referred to, sorted.
    pub orphan_availabilities: Vec<String>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshots(snapshots: impl IntoIterator<Item = Availability>) -> Self {
        let mut index = Self::new();
        for snapshot in snapshots {
            index.insert(snapshot);
        }
        index
    }

    /// Keeps the newer snapshot when a carpark is already indexed. Falls back
    /// to the later-received one if either timestamp does not parse.
    pub fn insert(&mut self, snapshot: Availability) {
        if let Some(existing) = self.by_carpark.get(&snapshot.carpark_number) {
            let keep_existing = matches!(
                (existing.parsed_update_datetime(), snapshot.parsed_update_datetime()),
                (Ok(current), Ok(incoming)) if current > incoming
            );
            if keep_existing {
                tracing::debug!(
                    "Ignoring stale availability for {} ({} is older than {})",
                    snapshot.carpark_number,
                    snapshot.update_datetime,
                    existing.update_datetime
                );
                return;
            }
            tracing::debug!(
                "Replacing availability for {} ({} -> {})",
                snapshot.carpark_number,
                existing.update_datetime,
                snapshot.update_datetime
            );
        }
        self.by_carpark
            .insert(snapshot.carpark_number.clone(), snapshot);
    }

    pub fn get(&self, carpark_no: &str) -> Option<&Availability> {
        self.by_carpark.get(carpark_no)
    }

    pub fn len(&self) -> usize {
        self.by_carpark.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_carpark.is_empty()
    }

    pub fn carpark_numbers(&self) -> Vec<&str> {
        let mut numbers: Vec<&str> = self.by_carpark.keys().map(String::as_str).collect();
        numbers.sort_unstable();
        numbers
    }

    /// Embeds a copy of each carpark's snapshot, clearing any stale one.
    pub fn attach(&self, carparks: &mut [Carpark]) -> AttachSummary {
        let mut summary = AttachSummary::default();
        let mut referenced: HashSet<String> = HashSet::new();

        for carpark in carparks.iter_mut() {
            carpark.availabilities = self.get(&carpark.car_park_no).cloned();
            if carpark.availabilities.is_some() {
                summary.matched += 1;
                referenced.insert(carpark.car_park_no.clone());
            } else {
                summary.unmatched_carparks.push(carpark.car_park_no.clone());
            }
        }

        summary.orphan_availabilities = self
            .carpark_numbers()
            .into_iter()
            .filter(|number| !referenced.contains(*number))
            .map(str::to_string)
            .collect();

        summary
    }
}
