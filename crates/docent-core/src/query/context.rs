/// Remaining budget must exceed this many characters before a partial chunk is appended.
pub const MIN_TRUNCATION: usize = 100;

const SEPARATOR: &str = "\n\n";
const TRUNCATION_MARKER: &str = "...";

/// Join chunk contents in rank order under a hard character budget.
///
/// Whole chunks are appended while they fit. The first chunk that does not fit
/// is cut and marked with `...` if more than [`MIN_TRUNCATION`] characters
/// remain, and assembly stops there. Separators and the marker count towards
/// the budget.
#[must_use]
pub fn assemble_context<'a, I>(contents: I, budget: usize) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let sep_len = SEPARATOR.chars().count();
    let marker_len = TRUNCATION_MARKER.chars().count();
    let mut out = String::new();
    let mut used = 0usize;
    let mut first = true;

    for content in contents {
        let sep = if first { 0 } else { sep_len };
        let len = content.chars().count();

        if used + sep + len <= budget {
            if sep > 0 {
                out.push_str(SEPARATOR);
            }
            out.push_str(content);
            used += sep + len;
            first = false;
            continue;
        }

        let remaining = budget.saturating_sub(used + sep);
        if remaining > MIN_TRUNCATION {
            if sep > 0 {
                out.push_str(SEPARATOR);
            }
            out.extend(content.chars().take(remaining - marker_len));
            out.push_str(TRUNCATION_MARKER);
        }
        break;
    }

    out
}


#[cfg(test)]
mod proptest_context {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn never_exceeds_budget(
            contents in prop::collection::vec(".{0,400}", 0..8),
            budget in 0usize..3000,
        ) {
            let ctx = assemble_context(contents.iter().map(String::as_str), budget);
            prop_assert!(ctx.chars().count() <= budget);
        }

        #[test]
        fn whole_chunks_kept_in_order(
            contents in prop::collection::vec("[a-z]{1,50}", 1..5),
        ) {
            let ctx = assemble_context(contents.iter().map(String::as_str), 10_000);
            prop_assert_eq!(ctx, contents.join("\n\n"));
        }

        #[test]
        fn output_is_prefix_of_full_join(
            contents in prop::collection::vec("[a-z ]{0,300}", 1..6),
            budget in 101usize..2000,
        ) {
            let full = contents.join("\n\n");
            let ctx = assemble_context(contents.iter().map(String::as_str), budget);
            let body = ctx.strip_suffix("...").unwrap_or(&ctx);
            prop_assert!(full.starts_with(body));
        }
    }
}
