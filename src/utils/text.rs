/// Number of whitespace-separated words in `text`.
///
/// This is the tokenisation used for the capture threshold. The tone
/// classifier deliberately uses substring matching instead.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
