use log::trace;

/// Upper bound on collapse passes; guards against pathological input only.
const MAX_COLLAPSE_PASSES: usize = 50;

/// Post-processes rendered Markdown: trims trailing whitespace from every
/// line, then collapses runs of blank lines down to a single blank line.
pub fn normalize_markdown(markdown: &str) -> String {
    trace!("Normalizing {} bytes of Markdown", markdown.len());

    let mut result = markdown
        .split('\n')
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");

    for _ in 0..MAX_COLLAPSE_PASSES {
        if !result.contains("\n\n\n") {
            break;
        }
        result = result.replace("\n\n\n", "\n\n");
    }

    result
}
