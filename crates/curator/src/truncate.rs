/// Cut a string to at most `max_chars` characters, never splitting a
/// multi-byte character. All budgets in this crate count characters.
pub(crate) fn truncate_to_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cuts_at_char_boundaries() {
        assert_eq!(truncate_to_chars("héllo", 2), "hé");
        assert_eq!(truncate_to_chars("héllo", 5), "héllo");
        assert_eq!(truncate_to_chars("héllo", 10), "héllo");
        assert_eq!(truncate_to_chars("abc", 0), "");
    }
}
