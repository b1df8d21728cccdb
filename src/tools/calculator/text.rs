//! Word counts and reading time

use super::CalcResult;

/// Case-insensitive count of whitespace-separated tokens equal to `word`
pub fn count_word_occurrences(text: &str, word: &str) -> usize {
    let needle = word.to_lowercase();
    text.to_lowercase()
        .split_whitespace()
        .filter(|token| *token == needle)
        .count()
}

pub fn estimate_reading_time(text: &str, wpm: u32) -> CalcResult<String> {
    if wpm == 0 {
        return Err("Reading speed must be at least one word per minute.".to_string());
    }
    let words = text.split_whitespace().count();
    let minutes = words as f64 / wpm as f64;
    Ok(format!("Estimated reading time: {:.2} minutes", minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_case_insensitive() {
        let text = "The cat saw the other cat. THE end";
        assert_eq!(count_word_occurrences(text, "the"), 3);
        assert_eq!(count_word_occurrences(text, "cat"), 1);
        assert_eq!(count_word_occurrences("", "cat"), 0);
    }

    #[test]
    fn test_reading_time() {
        let text = vec!["word"; 300].join(" ");
        assert_eq!(
            estimate_reading_time(&text, 200).unwrap(),
            "Estimated reading time: 1.50 minutes"
        );
        assert!(estimate_reading_time(&text, 0).is_err());
    }
}
