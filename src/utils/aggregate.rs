use std::{cmp::Ordering, collections::HashMap};

use tracing::{debug, warn};

use crate::{
    models::{
        lap::{LapRecord, LapTable},
        response::Detail,
    },
    utils::duration::normalize,
};

/// A driver's complete set of laps, sorted by lap number.
#[derive(Debug)]
pub struct DriverLaps<'a> {
    pub driver: Option<String>,
    pub driver_number: Option<u32>,
    pub laps: Vec<&'a LapRecord>,
}

#[derive(Debug)]
pub enum Aggregated<'a> {
    Fastest(Vec<&'a LapRecord>),
    Full(Vec<DriverLaps<'a>>),
}

pub fn aggregate(laps: &LapTable, detail: Detail) -> Aggregated<'_> {
    match detail {
        Detail::Summary => Aggregated::Fastest(fastest_laps(laps)),
        Detail::Full => Aggregated::Full(full_laps(laps)),
    }
}

/// Row indices of each driver's laps, drivers in order of first appearance.
fn group_by_driver(laps: &LapTable) -> Vec<(Option<String>, Vec<usize>)> {
    let mut positions: HashMap<Option<String>, usize> = HashMap::new();
    let mut groups: Vec<(Option<String>, Vec<usize>)> = Vec::new();

    for (idx, lap) in laps.iter().enumerate() {
        let key = lap.driver_key();
        match positions.get(&key) {
            Some(&pos) => groups[pos].1.push(idx),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, vec![idx]));
            }
        }
    }
    groups
}

/// Orders lap numbers ascending with missing numbers last.
fn lap_order(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Index of the fastest lap for every driver.
///
/// Ties on time go to the lowest lap number. A driver without a single valid
/// time is represented by their first lap.
pub fn fastest_lap_indices(laps: &LapTable) -> Vec<usize> {
    group_by_driver(laps)
        .into_iter()
        .filter_map(|(driver, rows)| {
            let timed = rows
                .iter()
                .filter_map(|&idx| {
                    let seconds = normalize(laps.get(idx)?.lap_time.as_ref())?;
                    Some((idx, seconds))
                })
                .min_by(|(a_idx, a_secs), (b_idx, b_secs)| {
                    a_secs
                        .total_cmp(b_secs)
                        .then_with(|| lap_order(laps[*a_idx].lap_number, laps[*b_idx].lap_number))
                        .then_with(|| a_idx.cmp(b_idx))
                })
                .map(|(idx, _)| idx);

            timed.or_else(|| {
                debug!("No valid lap time for {driver:?}, using first lap");
                rows.iter().copied().min_by(|a, b| {
                    lap_order(laps[*a].lap_number, laps[*b].lap_number).then_with(|| a.cmp(b))
                })
            })
        })
        .collect()
}

/// Resolves row indices back to laps, failing if any index is out of range.
pub fn resolve_rows<'a>(laps: &'a LapTable, indices: &[usize]) -> Option<Vec<&'a LapRecord>> {
    indices.iter().map(|&idx| laps.get(idx)).collect()
}

/// Selected rows, or the whole table untouched when the selection does not
/// resolve.
pub fn select_rows<'a>(laps: &'a LapTable, indices: &[usize]) -> Vec<&'a LapRecord> {
    match resolve_rows(laps, indices) {
        Some(rows) => rows,
        None => {
            warn!(
                "Fastest lap selection did not resolve against {} laps, returning laps as-is",
                laps.len()
            );
            laps.iter().collect()
        }
    }
}

pub fn fastest_laps(laps: &LapTable) -> Vec<&LapRecord> {
    select_rows(laps, &fastest_lap_indices(laps))
}

pub fn full_laps(laps: &LapTable) -> Vec<DriverLaps<'_>> {
    group_by_driver(laps)
        .into_iter()
        .map(|(driver, rows)| {
            let driver_number = rows.first().and_then(|&idx| laps[idx].driver_number);
            let mut driver_laps: Vec<&LapRecord> = rows.iter().map(|&idx| &laps[idx]).collect();
            // sort_by is stable, equal lap numbers keep provider order
            driver_laps.sort_by(|a, b| lap_order(a.lap_number, b.lap_number));
            DriverLaps {
                driver,
                driver_number,
                laps: driver_laps,
            }
        })
        .collect()
}
