//! Levenshtein edit distance / 编辑距离

/// Minimum number of single-character insertions, deletions or substitutions
/// turning `a` into `b`. Counts `char`s, not bytes.
///
/// Uses two rolling rows sized by the shorter input.
pub fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Shorter string along the row
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = if lc == sc { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "a",
        "abc",
        "abd",
        "kitten",
        "sitting",
        "deathader",
        "deathadder",
        "razer deathadder v3 mouse",
        "mouse",
        "ratón",
        "raton",
        "テスト",
        "🖱️",
    ];

    #[test]
    fn test_levenshtein() {
        assert_eq!(distance("", ""), 0);
        assert_eq!(distance("abc", "abc"), 0);
        assert_eq!(distance("abc", "abd"), 1);
        assert_eq!(distance("abc", "abcd"), 1);
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("flaw", "lawn"), 2);
        assert_eq!(distance("deathader", "deathadder"), 1);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(distance("ratón", "raton"), 1);
        assert_eq!(distance("", "テスト"), 3);
        assert_eq!(distance("テスト", "テキスト"), 1);
    }

    #[test]
    fn test_identity_is_zero() {
        for a in SAMPLES {
            assert_eq!(distance(a, a), 0, "distance({:?}, {:?})", a, a);
        }
    }

    #[test]
    fn test_empty_is_length() {
        for s in SAMPLES {
            assert_eq!(distance("", s), s.chars().count());
            assert_eq!(distance(s, ""), s.chars().count());
        }
    }

    #[test]
    fn test_symmetry() {
        for a in SAMPLES {
            for b in SAMPLES {
                assert_eq!(distance(a, b), distance(b, a), "{:?} / {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_triangle_inequality() {
        for a in SAMPLES {
            for b in SAMPLES {
                for c in SAMPLES {
                    assert!(
                        distance(a, c) <= distance(a, b) + distance(b, c),
                        "{:?} {:?} {:?}",
                        a,
                        b,
                        c
                    );
                }
            }
        }
    }

    #[test]
    fn test_bounded_by_longer_length() {
        for a in SAMPLES {
            for b in SAMPLES {
                let longer = a.chars().count().max(b.chars().count());
                assert!(distance(a, b) <= longer);
            }
        }
    }
}
