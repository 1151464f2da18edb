//! Free-text prompt search

use crate::prompt::Prompt;

/// Whether `prompt` matches an already-lowercased query
fn matches(prompt: &Prompt, needle: &str) -> bool {
    prompt.title.to_lowercase().contains(needle)
        || prompt.content.to_lowercase().contains(needle)
        || prompt.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Keep prompts whose title, content or any tag contains `query`,
/// ignoring case. A blank query keeps everything.
pub fn matching(prompts: Vec<Prompt>, query: &str) -> Vec<Prompt> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return prompts;
    }
    prompts.into_iter().filter(|p| matches(p, &needle)).collect()
}
