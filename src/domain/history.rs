// Bounded trailing history of polled readings
use serde::Serialize;
use std::collections::VecDeque;

pub const HISTORY_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPoint {
    pub time: String,
    pub sand_level: f64,
}

impl HistoricalPoint {
    /// Build a chart point; the level is rounded to two decimal places.
    pub fn new(time: String, sand_level: f64) -> Self {
        Self {
            time,
            sand_level: (sand_level * 100.0).round() / 100.0,
        }
    }
}

/// FIFO window holding at most [`HISTORY_CAPACITY`] points, oldest first.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    points: VecDeque<HistoricalPoint>,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    pub fn push(&mut self, point: HistoricalPoint) {
        self.points.push_back(point);
        while self.points.len() > HISTORY_CAPACITY {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn latest(&self) -> Option<&HistoricalPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoricalPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoricalPoint> {
        self.iter().cloned().collect()
    }
}
