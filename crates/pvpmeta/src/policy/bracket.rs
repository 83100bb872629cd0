use std::collections::HashMap;
use std::sync::LazyLock;

/// Family a leaderboard bracket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketFamily {
    TwoVTwo,
    ThreeVThree,
    /// Solo shuffle, overall and per-spec.
    ShuffleLike,
    /// Rated battlegrounds and blitz.
    RbgLike,
    /// Fallback for brackets no predicate claims.
    Default,
}

/// Sync parameters for one bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPolicy {
    /// Leaderboard entries considered, from the top.
    pub top_n: usize,
    /// Entries below this rating are dropped.
    pub rating_min: i32,
    /// Work lane label.
    pub queue: &'static str,
}

type Predicate = fn(&str) -> bool;

fn is_two_v_two(bracket: &str) -> bool {
    bracket == "2v2"
}

fn is_three_v_three(bracket: &str) -> bool {
    bracket == "3v3"
}

fn is_shuffle(bracket: &str) -> bool {
    bracket == "shuffle-overall" || bracket.starts_with("shuffle-")
}

fn is_battleground(bracket: &str) -> bool {
    bracket == "rbg" || bracket == "blitz-overall" || bracket.starts_with("blitz-")
}

/// Evaluated in order; first match wins.
const CLASSIFIERS: &[(Predicate, BracketFamily)] = &[
    (is_two_v_two, BracketFamily::TwoVTwo),
    (is_three_v_three, BracketFamily::ThreeVThree),
    (is_shuffle, BracketFamily::ShuffleLike),
    (is_battleground, BracketFamily::RbgLike),
];

/// Per-bracket overrides checked before family defaults. Empty by default.
static EXPLICIT_OVERRIDES: LazyLock<HashMap<&'static str, BracketPolicy>> =
    LazyLock::new(HashMap::new);

/// Family of `bracket`, or `None` when no predicate matches.
pub fn classify(bracket: &str) -> Option<BracketFamily> {
    CLASSIFIERS
        .iter()
        .find(|(matches, _)| matches(bracket))
        .map(|(_, family)| *family)
}

/// Defaults for a family.
pub fn family_policy(family: BracketFamily) -> BracketPolicy {
    match family {
        BracketFamily::TwoVTwo => BracketPolicy {
            top_n: 500,
            rating_min: 1800,
            queue: "pvp_sync_2v2",
        },
        BracketFamily::ThreeVThree => BracketPolicy {
            top_n: 500,
            rating_min: 2000,
            queue: "pvp_sync_3v3",
        },
        BracketFamily::ShuffleLike => BracketPolicy {
            top_n: 500,
            rating_min: 2200,
            queue: "pvp_sync_shuffle",
        },
        BracketFamily::RbgLike => BracketPolicy {
            top_n: 500,
            rating_min: 2000,
            queue: "pvp_sync_rbg",
        },
        BracketFamily::Default => BracketPolicy {
            top_n: 500,
            rating_min: 1800,
            queue: "default",
        },
    }
}

/// Policy for `bracket`. Always returns one; unknown brackets get the default.
pub fn policy_for(bracket: &str) -> BracketPolicy {
    if let Some(policy) = EXPLICIT_OVERRIDES.get(bracket) {
        return *policy;
    }
    family_policy(classify(bracket).unwrap_or(BracketFamily::Default))
}

/// Whether a discovered bracket should be synced at all.
///
/// Unclassified brackets and battleground-style brackets are skipped.
pub fn is_syncable(bracket: &str) -> bool {
    matches!(
        classify(bracket),
        Some(BracketFamily::TwoVTwo | BracketFamily::ThreeVThree | BracketFamily::ShuffleLike)
    )
}
