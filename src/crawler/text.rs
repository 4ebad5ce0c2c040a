//! Text cleaning for extracted page text
//!
//! The extractor hands the raw visible text of a page, one text node per
//! line, to a `TextCleaner`. Swap the cleaner to change what counts as noise.

/// Turns raw visible page text into indexable text
pub trait TextCleaner: Send + Sync {
    fn clean(&self, raw: &str) -> String;
}

/// Default cleaner
///
/// - Trims every line and drops blank ones
/// - Drops lines made only of punctuation or symbols (`|`, `»`, `©`, `---`)
/// - Collapses all remaining whitespace into single spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespacePruner;

impl TextCleaner for WhitespacePruner {
    fn clean(&self, raw: &str) -> String {
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| line.chars().any(char::is_alphanumeric))
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<F> TextCleaner for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn clean(&self, raw: &str) -> String {
        self(raw)
    }
}
