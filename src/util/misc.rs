/// Placeholder written for a value that is not available
pub const MISSING: &str = ".";

/// `.`, `NA`, `NaN` or nothing at all
pub fn is_missing(value: &str) -> bool {
    matches!(value, "." | "NA" | "NaN" | "")
}

/// Boolean flags come in several spellings upstream
pub fn is_true_flag(value: &str) -> bool {
    matches!(value, "True" | "TRUE" | "true")
}

/// Python-style boolean literal used by the cluster column
pub fn flag_str(flag: bool) -> &'static str {
    if flag {
        "True"
    } else {
        "False"
    }
}

/// paste words into `Box<str>`
///
/// * `words`
/// * `sep`
pub fn paste<S: AsRef<str>>(words: &[S], sep: &str) -> Box<str> {
    let mut ret = String::new();
    let n = words.len();
    for (i, w) in words.iter().enumerate() {
        ret.push_str(w.as_ref());
        if n > 1 && i < (n - 1) {
            ret.push_str(sep);
        }
    }
    ret.into_boxed_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paste() {
        assert_eq!(paste(&["chr1", "100", "A", "T"], ":").as_ref(), "chr1:100:A:T");
        assert_eq!(paste(&["only"], "\t").as_ref(), "only");
        assert_eq!(paste::<&str>(&[], "\t").as_ref(), "");
    }

    #[test]
    fn test_missing_and_flags() {
        assert!(is_missing("."));
        assert!(is_missing("NA"));
        assert!(!is_missing("0.0"));
        assert!(is_true_flag("TRUE"));
        assert!(!is_true_flag("1"));
        assert_eq!(flag_str(false), "False");
    }
}
