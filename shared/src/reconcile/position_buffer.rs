use crate::reconcile::{error::SampleError, position_sample::PositionSample};

/// Small, timestamp-ordered history of authoritative samples for one body.
///
/// Samples may arrive out of order; each insert scans from the newest end,
/// which is cheap because buffers only hold a handful of entries and most
/// samples arrive in order.
pub struct PositionBuffer {
    samples: Vec<PositionSample>,
    capacity: usize,
    last_reconciled: Option<f64>,
    last_received_at: Option<f64>,
}

impl PositionBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity + 1),
            capacity: capacity.max(1),
            last_reconciled: None,
            last_received_at: None,
        }
    }

    /// Inserts `sample` in timestamp order. `received_at` is the local
    /// simulation time at which it arrived, used to detect a lost authority.
    pub fn insert(&mut self, sample: PositionSample, received_at: f64) -> Result<(), SampleError> {
        if !sample.is_finite() {
            return Err(SampleError::NonFinite {
                timestamp: sample.timestamp,
            });
        }
        if let Some(last_reconciled) = self.last_reconciled {
            if sample.timestamp <= last_reconciled {
                return Err(SampleError::Stale {
                    timestamp: sample.timestamp,
                    last_reconciled,
                });
            }
        }

        let mut index = self.samples.len();
        loop {
            if index == 0 {
                // older than everything buffered
                self.samples.insert(0, sample);
                break;
            }

            index -= 1;

            let existing = self.samples[index].timestamp;
            if existing == sample.timestamp {
                return Err(SampleError::Duplicate {
                    timestamp: sample.timestamp,
                });
            }
            if existing < sample.timestamp {
                self.samples.insert(index + 1, sample);
                break;
            }
        }

        while self.samples.len() > self.capacity {
            self.samples.remove(0);
        }

        self.last_received_at = Some(match self.last_received_at {
            Some(previous) => previous.max(received_at),
            None => received_at,
        });

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionSample> {
        self.samples.iter()
    }

    pub fn front(&self) -> Option<&PositionSample> {
        self.samples.first()
    }

    pub fn newest(&self) -> Option<&PositionSample> {
        self.samples.last()
    }

    pub fn pop_front(&mut self) -> Option<PositionSample> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.samples.remove(0))
        }
    }

    /// Removes every sample taken at or before `now` and returns the newest
    /// of them, or `None` if no buffered sample has been reached yet.
    pub fn pop_passed(&mut self, now: f64) -> Option<PositionSample> {
        let passed = self
            .samples
            .partition_point(|sample| sample.timestamp <= now);
        if passed == 0 {
            return None;
        }
        self.samples.drain(..passed).last()
    }

    /// Drops samples that are not newer than the last reconciled waypoint.
    /// Returns how many were dropped.
    pub fn discard_stale(&mut self) -> usize {
        let Some(last_reconciled) = self.last_reconciled else {
            return 0;
        };
        let before = self.samples.len();
        self.samples
            .retain(|sample| sample.timestamp > last_reconciled);
        before - self.samples.len()
    }

    pub fn mark_reconciled(&mut self, timestamp: f64) {
        self.last_reconciled = Some(match self.last_reconciled {
            Some(previous) => previous.max(timestamp),
            None => timestamp,
        });
    }

    pub fn last_reconciled(&self) -> Option<f64> {
        self.last_reconciled
    }

    pub fn last_received_at(&self) -> Option<f64> {
        self.last_received_at
    }

    /// Drops every buffered sample but remembers the reconciled and
    /// received timestamps.
    pub fn clear_samples(&mut self) {
        self.samples.clear();
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_reconciled = None;
        self.last_received_at = None;
    }
}
