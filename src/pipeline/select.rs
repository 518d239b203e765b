//! Page-spec parsing: turn `"1-3, 5, 8"` into the pages to export.
//!
//! The parser is deliberately lenient. Tokens that do not parse are skipped,
//! single pages outside the document are dropped, and ranges are normalised
//! (`8-3` is `3-8`) and clamped to the document rather than rejected. It
//! never fails; the worst case is an empty selection, which the pipeline
//! reports as "nothing to convert".

use std::collections::BTreeSet;

/// Pages selected for export: distinct, ascending, each in `[1, page_count]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSelection(Vec<usize>);

impl PageSelection {
    /// Resolve `spec` against a document of `page_count` pages.
    pub fn parse(spec: &str, page_count: usize) -> Self {
        PageSelection(parse_page_spec(spec, page_count))
    }

    pub fn pages(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}

/// Parse a comma-separated page spec into ascending, deduplicated page numbers.
///
/// An empty or whitespace-only spec selects `1..=page_count`.
pub fn parse_page_spec(spec: &str, page_count: usize) -> Vec<usize> {
    if spec.trim().is_empty() {
        return (1..=page_count).collect();
    }

    let mut wanted = BTreeSet::new();
    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((a, b)) = token.split_once('-') {
            let (Some(a), Some(b)) = (leading_int(a), leading_int(b)) else {
                continue;
            };
            let start = a.min(b).max(1);
            let end = a.max(b).min(page_count);
            wanted.extend(start..=end);
        } else if let Some(n) = leading_int(token) {
            if (1..=page_count).contains(&n) {
                wanted.insert(n);
            }
        }
    }
    wanted.into_iter().collect()
}

/// Base-10 integer prefix of `s` after leading whitespace (`"3x"` is 3,
/// `"x3"` is nothing). A `-` never reaches here as a sign: any token holding
/// one is split as a range first. Values too large for `usize` saturate.
fn leading_int(s: &str) -> Option<usize> {
    let s = s.trim_start();
    let digits = s.strip_prefix('+').unwrap_or(s);
    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    Some(digits[..len].parse::<usize>().unwrap_or(usize::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_selects_all_pages() {
        assert_eq!(parse_page_spec("", 4), vec![1, 2, 3, 4]);
        assert_eq!(parse_page_spec("   ", 2), vec![1, 2]);
        assert_eq!(parse_page_spec("", 0), Vec::<usize>::new());
    }

    #[test]
    fn singles_and_ranges() {
        assert_eq!(parse_page_spec("1,3,5-8", 10), vec![1, 3, 5, 6, 7, 8]);
        assert_eq!(parse_page_spec("1-3, 5, 8", 10), vec![1, 2, 3, 5, 8]);
    }

    #[test]
    fn reversed_range_is_normalised() {
        assert_eq!(parse_page_spec("8-3", 10), vec![3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn out_of_range_singles_are_dropped() {
        assert_eq!(parse_page_spec("0,99", 10), Vec::<usize>::new());
        assert_eq!(parse_page_spec("0", 3), Vec::<usize>::new());
    }

    #[test]
    fn ranges_are_clamped() {
        assert_eq!(parse_page_spec("0-2", 10), vec![1, 2]);
        assert_eq!(parse_page_spec("8-99", 10), vec![8, 9, 10]);
        assert_eq!(parse_page_spec("20-30", 10), Vec::<usize>::new());
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(parse_page_spec("2,2,2", 5), vec![2]);
        assert_eq!(parse_page_spec("1-3,2-4,3", 5), vec![1, 2, 3, 4]);
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        assert_eq!(parse_page_spec("abc,2", 5), vec![2]);
        assert_eq!(parse_page_spec("abc", 5), Vec::<usize>::new());
        assert_eq!(parse_page_spec("a-3,4", 5), vec![4]);
        assert_eq!(parse_page_spec(",,3,,", 5), vec![3]);
    }

    #[test]
    fn numeric_prefix_is_accepted() {
        assert_eq!(parse_page_spec("2nd", 5), vec![2]);
        assert_eq!(parse_page_spec(" 4 ", 5), vec![4]);
    }

    #[test]
    fn doubled_hyphen_is_malformed() {
        assert_eq!(parse_page_spec("3--5", 5), Vec::<usize>::new());
        assert_eq!(parse_page_spec("-2", 5), Vec::<usize>::new());
    }

    #[test]
    fn huge_numbers_do_not_overflow() {
        assert_eq!(
            parse_page_spec("3-99999999999999999999999", 5),
            vec![3, 4, 5]
        );
    }

    #[test]
    fn selection_wraps_parser() {
        let sel = PageSelection::parse("5,1", 5);
        assert_eq!(sel.pages(), &[1, 5]);
        assert_eq!(sel.len(), 2);
        assert!(!sel.is_empty());
        assert!(PageSelection::parse("9", 5).is_empty());
    }
}
