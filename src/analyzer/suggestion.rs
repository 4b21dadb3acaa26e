use crate::domain::version;
use crate::domain::TagKind;
use crate::error::Result;
use crate::git::Repository;

/// Default major alias when the repository has no usable tags
pub const INITIAL_MAJOR: &str = "v1";

/// Glob matching every candidate release tag
pub const RELEASE_TAG_PATTERN: &str = "v*";

/// Computes default tag values from the repository's tag state
///
/// Suggestions are pure reads: computing them twice against the same state
/// yields the same answer and never mutates the repository.
pub struct TagSuggester<'a, R: Repository> {
    repo: &'a R,
}

impl<'a, R: Repository> TagSuggester<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        TagSuggester { repo }
    }

    /// Suggest the major alias tag to move
    pub fn suggest_major(&self) -> Result<String> {
        let head = self.repo.head_commit()?;
        let at_head = self.repo.tags_pointing_at(head)?;
        let all = self.repo.list_tags(RELEASE_TAG_PATTERN)?;
        Ok(suggest_major(at_head.as_slice(), all.as_slice()))
    }

    /// Suggest the semver tag to create under `major_tag`
    pub fn suggest_semver(&self, major_tag: &str) -> Result<String> {
        let candidates = self.repo.list_tags(&format!("{}.*", major_tag))?;
        Ok(suggest_semver(major_tag, candidates.as_slice()))
    }

    /// `v*` tags that follow neither the semver nor the major grammar
    pub fn ignored_tags(&self) -> Result<Vec<String>> {
        let all = self.repo.list_tags(RELEASE_TAG_PATTERN)?;
        Ok(ignored_tags(all.as_slice()))
    }
}

/// Pick the major alias:
/// 1. the highest major tag already at HEAD,
/// 2. else the major of the highest semver tag overall,
/// 3. else [INITIAL_MAJOR].
pub fn suggest_major<S: AsRef<str>>(tags_at_head: &[S], all_tags: &[S]) -> String {
    let at_head = tags_at_head
        .iter()
        .filter_map(|tag| version::parse_major(tag.as_ref()))
        .max();
    if let Some(major) = at_head {
        return format!("v{}", major);
    }

    newest_semver(all_tags.iter().map(|tag| tag.as_ref()))
        .and_then(version::major_of)
        .unwrap_or_else(|| INITIAL_MAJOR.to_string())
}

/// Pick the next semver tag under `major_tag`: a patch bump of the highest
/// existing release in that major line, else `<major_tag>.0.0`.
pub fn suggest_semver<S: AsRef<str>>(major_tag: &str, candidates: &[S]) -> String {
    let Some(major) = version::parse_major(major_tag) else {
        return format!("{}.0.0", major_tag);
    };

    let latest = newest_semver(
        candidates
            .iter()
            .map(|tag| tag.as_ref())
            .filter(|tag| version::parse(tag).is_some_and(|v| v.major == major)),
    );

    match latest.and_then(version::parse) {
        Some(latest) => latest.bump_patch().tag_name(),
        None => format!("{}.0.0", major_tag),
    }
}

/// Tags that match neither release grammar
pub fn ignored_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.as_ref())
        .filter(|tag| TagKind::of(tag).is_none())
        .map(str::to_string)
        .collect()
}

fn newest_semver<'t>(tags: impl Iterator<Item = &'t str>) -> Option<&'t str> {
    let mut releases: Vec<&str> = tags.filter(|tag| version::is_semver_tag(tag)).collect();
    version::sort_descending(&mut releases);
    releases.first().copied()
}
