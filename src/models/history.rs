use serde::{Deserialize, Serialize};

/// Maximum number of samples kept for style learning.
pub const MAX_SAMPLES: usize = 6;

/// Minimum word count for text to count as a sample.
pub const MIN_WORDS: usize = 3;

/// Samples needed before suggestions are offered.
pub const MIN_SAMPLES: usize = 3;

/// Outcome of appending a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// Position of the new sample after any eviction.
    pub index: usize,
    pub evicted: bool,
}

/// Bounded, capture-ordered list of the user's own comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CommentHistory {
    samples: Vec<String>,
}

impl CommentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.samples.get(index).map(String::as_str)
    }

    pub fn push(&mut self, sample: String) -> PushOutcome {
        self.samples.push(sample);
        let evicted = self.samples.len() > MAX_SAMPLES;
        if evicted {
            let overflow = self.samples.len() - MAX_SAMPLES;
            self.samples.drain(..overflow);
        }
        PushOutcome {
            index: self.samples.len() - 1,
            evicted,
        }
    }

    /// Overwrites the sample at `index`. Returns false when out of range.
    pub fn replace(&mut self, index: usize, sample: String) -> bool {
        match self.samples.get_mut(index) {
            Some(slot) => {
                *slot = sample;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.samples.len() {
            Some(self.samples.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl From<Vec<String>> for CommentHistory {
    /// Keeps the newest `MAX_SAMPLES` entries of a stored list.
    fn from(mut samples: Vec<String>) -> Self {
        if samples.len() > MAX_SAMPLES {
            let overflow = samples.len() - MAX_SAMPLES;
            samples.drain(..overflow);
        }
        Self { samples }
    }
}

impl From<CommentHistory> for Vec<String> {
    fn from(history: CommentHistory) -> Self {
        history.samples
    }
}
