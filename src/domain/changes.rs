// src/domain/changes.rs

use crate::domain::booking::{BookingKey, BookingRecord};
use std::collections::{HashMap, HashSet};

/// A booking that exists in both snapshots but changed hands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    pub before: BookingRecord,
    pub after: BookingRecord,
}

/// Added / changed / removed bookings between two snapshots of the same date.
///
/// `added` and `changed` follow the order of the current snapshot,
/// `removed` follows the order of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delta {
    pub added: Vec<BookingRecord>,
    pub changed: Vec<Reassignment>,
    pub removed: Vec<BookingRecord>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Keyed view over a snapshot. If a key shows up twice the first occurrence
/// keeps its position and the last one wins the value.
struct Keyed<'a> {
    order: Vec<BookingKey<'a>>,
    by_key: HashMap<BookingKey<'a>, &'a BookingRecord>,
}

impl<'a> Keyed<'a> {
    fn new(records: &'a [BookingRecord]) -> Self {
        let mut order = Vec::with_capacity(records.len());
        let mut seen = HashSet::with_capacity(records.len());
        let mut by_key = HashMap::with_capacity(records.len());

        for record in records {
            let key = record.key();
            if seen.insert(key.clone()) {
                order.push(key.clone());
            }
            by_key.insert(key, record);
        }

        Self { order, by_key }
    }

    fn iter(&self) -> impl Iterator<Item = (&BookingKey<'a>, &'a BookingRecord)> + '_ {
        self.order.iter().map(move |k| (k, self.by_key[k]))
    }
}

pub fn compute_delta(previous: &[BookingRecord], current: &[BookingRecord]) -> Delta {
    let old = Keyed::new(previous);
    let new = Keyed::new(current);

    let mut delta = Delta::default();

    for (key, record) in new.iter() {
        match old.by_key.get(key) {
            None => delta.added.push(record.clone()),
            Some(before) if before.responsible != record.responsible => {
                delta.changed.push(Reassignment {
                    before: (**before).clone(),
                    after: record.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for (key, record) in old.iter() {
        if !new.by_key.contains_key(key) {
            delta.removed.push(record.clone());
        }
    }

    delta
}
