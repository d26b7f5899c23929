//! Casting block: actor names, each optionally followed by a role line.
//!
//! The role label is swapped for a sentinel plus a private marker, so the role
//! always opens its own token even when the page put it in the name's node.
//! A role is the text after the marker or, when the marker stands alone, the
//! next token. The next name-shaped token after that starts a new actor.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::record::CastMember;
use crate::settings::CastingLabels;
use crate::text::{self, compile_pattern, is_padding};

const ROLE_MARK: char = '\u{E001}';
/// Sentinel then role mark.
const ROLE_OPEN: &str = "¤\u{E001}";

static ACTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{L}[\p{L}\p{M}'’.\- ]*$").unwrap());

#[derive(Debug, Clone)]
pub struct CastingPatterns {
    role_label: Regex,
    headings: BTreeSet<String>,
}

impl CastingPatterns {
    pub fn new(labels: &CastingLabels) -> Result<Self> {
        let label = labels
            .role_label
            .split_whitespace()
            .map(regex::escape)
            .join(r"\s*");
        Ok(Self {
            role_label: compile_pattern("casting.role_label", &format!("(?i){label}"))?,
            headings: labels.headings.iter().map(|h| h.trim().to_lowercase()).collect(),
        })
    }

    fn is_heading(&self, token: &str) -> bool {
        self.headings.contains(&token.to_lowercase())
    }
}

pub fn extract(raw: &str, patterns: &CastingPatterns) -> Vec<CastMember> {
    let flat = text::normalize(raw, false);
    let marked = patterns.role_label.replace_all(&flat, ROLE_OPEN);

    let mut cast: Vec<CastMember> = Vec::new();
    let mut awaiting_role = false;
    for token in text::split(&marked) {
        if patterns.is_heading(token) {
            awaiting_role = false;
            continue;
        }
        if let Some(rest) = token.strip_prefix(ROLE_MARK) {
            let role = rest.trim_matches(is_padding);
            awaiting_role = role.is_empty();
            if !awaiting_role {
                assign_role(&mut cast, role);
            }
            continue;
        }
        if awaiting_role {
            awaiting_role = false;
            assign_role(&mut cast, token);
            continue;
        }
        if ACTOR_RE.is_match(token) {
            cast.push(CastMember {
                name: token.to_string(),
                role: None,
            });
        } else {
            debug!(token, "casting token is neither actor nor role");
        }
    }

    // first appearance of a name keeps its slot and role
    cast.into_iter().unique_by(|m| m.name.clone()).collect()
}

/// Roles before any actor, or a second role for the same actor, are dropped.
fn assign_role(cast: &mut [CastMember], role: &str) {
    match cast.last_mut() {
        Some(member) if member.role.is_none() => member.role = Some(role.to_string()),
        _ => debug!(role, "role without an actor to attach to"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::SENTINEL;

    fn patterns() -> CastingPatterns {
        CastingPatterns::new(&CastingLabels::default()).unwrap()
    }

    #[test]
    fn actors_with_and_without_roles() {
        let raw = "Acteurs et actrices\nAustin Butler\nRôle : Benny\nTom Hardy\nRôle : Johnny\nJodie Comer";
        let cast = extract(raw, &patterns());
        assert_eq!(
            cast,
            vec![
                CastMember { name: "Austin Butler".into(), role: Some("Benny".into()) },
                CastMember { name: "Tom Hardy".into(), role: Some("Johnny".into()) },
                CastMember { name: "Jodie Comer".into(), role: None },
            ]
        );
    }

    #[test]
    fn label_spacing_and_case_vary() {
        let raw = "Michael Shannon\n\nrôle: Zipco\nNorman Reedus\nRÔLE  :  Funny Sonny";
        let cast = extract(raw, &patterns());
        assert_eq!(cast[0].role.as_deref(), Some("Zipco"));
        assert_eq!(cast[1].role.as_deref(), Some("Funny Sonny"));
    }

    #[test]
    fn role_in_its_own_node() {
        let cast = extract("Austin Butler\nRôle :\nBenny\nTom Hardy", &patterns());
        assert_eq!(
            cast,
            vec![
                CastMember { name: "Austin Butler".into(), role: Some("Benny".into()) },
                CastMember { name: "Tom Hardy".into(), role: None },
            ]
        );
    }

    #[test]
    fn role_sharing_the_name_node() {
        let cast = extract("Austin Butler Rôle : Benny\nTom Hardy\nRôle : Johnny", &patterns());
        assert_eq!(
            cast,
            vec![
                CastMember { name: "Austin Butler".into(), role: Some("Benny".into()) },
                CastMember { name: "Tom Hardy".into(), role: Some("Johnny".into()) },
            ]
        );
    }

    #[test]
    fn heading_ends_a_pending_role() {
        let cast = extract("Jodie Comer\nRôle :\nActeurs\nMike Faist", &patterns());
        assert_eq!(cast[0].role, None);
        assert_eq!(cast[1].name, "Mike Faist");
    }

    #[test]
    fn repeated_actor_keeps_first_role() {
        let raw = "Casting complet\nJean Dupont\nRôle : Le Roi\nJean Dupont\nRôle : Le Valet";
        let cast = extract(raw, &patterns());
        assert_eq!(cast.len(), 1);
        assert_eq!(cast[0].role.as_deref(), Some("Le Roi"));
    }

    #[test]
    fn orphan_role_and_noise_are_skipped() {
        let raw = "Rôle : Personne\n12\nMarie Martin\n…";
        let cast = extract(raw, &patterns());
        assert_eq!(cast, vec![CastMember { name: "Marie Martin".into(), role: None }]);
        assert!(extract("", &patterns()).is_empty());
    }

    #[test]
    fn sentinel_in_content_does_not_crash() {
        let raw = "Jean¤Dupont\nRôle : Le ¤ Roi";
        let cast = extract(raw, &patterns());
        assert!(cast.iter().all(|m| !m.name.contains(SENTINEL)));
    }
}
