//! Resource command modules.
//!
//! Each module maps one Kong admin resource (service, route, consumer,
//! plugin, upstream, target) to a clap subcommand tree. Paths are always
//! resource-relative with plural collection segments and no leading slash,
//! e.g. `services/{id}` or `upstreams/{upstream}/targets/{target}`.

pub mod consumer;
pub mod plugin;
pub mod route;
pub mod service;
pub mod target;
pub mod upstream;

/// Join a resource collection with the first usable identifier, preferring
/// earlier candidates.
pub(crate) fn resource_path<'a, I>(resource: &str, candidates: I) -> anyhow::Result<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.is_empty())
        .map(|id| format!("{resource}/{id}"))
        .ok_or_else(|| anyhow::anyhow!("missing identifier for {resource}: a name or id is required"))
}

/// First non-empty value among optional flags.
pub(crate) fn first_nonempty<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .flatten()
        .find(|candidate| !candidate.is_empty())
}
