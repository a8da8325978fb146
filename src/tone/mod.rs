pub mod classifier;

pub use classifier::{classify, count_keywords, ToneCounts, ToneLabel};
