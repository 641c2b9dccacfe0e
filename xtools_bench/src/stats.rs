use log::{trace, warn};
use xtools_core::Named;

/// Parses the statistics printed by a program.
///
/// Each line has the form `KEY VALUE`: the key is everything before the first space,
/// the value is the following space-separated token with surrounding whitespace trimmed.
/// Lines without a space carry no statistic and are ignored.
pub fn parse_stats(output: &str) -> Named<String> {
    let mut stats = Named::new();
    for line in output.lines() {
        let mut fields = line.split(' ');
        let key = fields.next().unwrap_or_default();
        match fields.next() {
            Some(value) if !key.is_empty() => {
                stats.insert(key.to_owned(), value.trim().to_owned());
            }
            _ => trace!(target: "stats", "ignoring output line '{line}'"),
        }
    }
    stats
}

/// Keeps the `expected` statistics, in the order they are listed.
///
/// A warning is emitted for each expected key that the program did not report.
pub fn extract_stats(stats: &Named<String>, expected: &[String]) -> Named<String> {
    let mut extracted = Named::new();
    for key in expected {
        if let Some(value) = stats.get(key) {
            extracted.insert(key.clone(), value.clone());
        } else {
            warn!(target: "stats", "unknown stat {key}");
        }
    }
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_value_lines() {
        let stats = parse_stats("VISITED_STATES 42\nRUNNING_TIME_SECONDS 0.25 \nMEMORY 10 kB\nnoise\n\n");
        assert_eq!(stats.get("VISITED_STATES").map(String::as_str), Some("42"));
        assert_eq!(stats.get("RUNNING_TIME_SECONDS").map(String::as_str), Some("0.25"));
        assert_eq!(stats.get("MEMORY").map(String::as_str), Some("10"));
        assert_eq!(stats.len(), 3);
    }

    #[test]
    fn extract_expected() {
        let stats = parse_stats("A 1\nB 2\nC 3\n");
        let expected = vec!["C".to_owned(), "A".to_owned(), "Z".to_owned()];
        let extracted = extract_stats(&stats, &expected);
        assert_eq!(extracted.keys().map(String::as_str).collect::<Vec<_>>(), ["C", "A"]);
    }
}
