use std::collections::VecDeque;

/// Recently inserted suggestions, so the tracker never learns from its own
/// output. Oldest entries fall out once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct InsertedSuggestions {
    capacity: usize,
    entries: VecDeque<String>,
}

impl InsertedSuggestions {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn insert(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.entries.retain(|entry| entry != text);
        self.entries.push_back(text.to_string());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Removes `text` if present and reports whether it was.
    pub fn take(&mut self, text: &str) -> bool {
        let text = text.trim();
        match self.entries.iter().position(|entry| entry == text) {
            Some(position) => {
                self.entries.remove(position);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_a_match_once() {
        let mut inserted = InsertedSuggestions::new(20);
        inserted.insert("  Great post, thanks for sharing ");
        assert!(inserted.take("Great post, thanks for sharing"));
        assert!(!inserted.take("Great post, thanks for sharing"));
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut inserted = InsertedSuggestions::new(3);
        for n in 0..5 {
            inserted.insert(&format!("suggestion {n}"));
        }
        assert_eq!(inserted.len(), 3);
        assert!(!inserted.take("suggestion 0"));
        assert!(!inserted.take("suggestion 1"));
        assert!(inserted.take("suggestion 4"));
    }

    #[test]
    fn reinserting_refreshes_recency() {
        let mut inserted = InsertedSuggestions::new(2);
        inserted.insert("a b c");
        inserted.insert("d e f");
        inserted.insert("a b c");
        inserted.insert("g h i");
        assert!(inserted.take("a b c"));
        assert!(!inserted.take("d e f"));
    }
}
