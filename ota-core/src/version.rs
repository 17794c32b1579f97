/// Version token handling and the update decision
use std::cmp::Ordering;
use std::fmt;

use crate::config::UpdatePolicy;

/// Longest token read from the version endpoint (32-byte buffer incl. terminator)
pub const MAX_TOKEN_LEN: usize = 31;

/// The short version string served by the version endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken(String);

impl VersionToken {
    /// Build a token from a raw response body.
    ///
    /// Only the first [`MAX_TOKEN_LEN`] bytes are considered and reading stops
    /// at the first NUL. Surrounding whitespace is dropped, so a `version.txt`
    /// with a trailing newline compares equal to the bare version. Returns
    /// `None` when nothing is left.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let window = &body[..body.len().min(MAX_TOKEN_LEN)];
        let window = match window.iter().position(|&b| b == 0) {
            Some(nul) => &window[..nul],
            None => window,
        };

        let text = String::from_utf8_lossy(window);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of comparing the running version against the served token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    UpToDate,
    Available { server: String },
}

impl UpdateDecision {
    pub fn is_available(&self) -> bool {
        matches!(self, UpdateDecision::Available { .. })
    }
}

/// Decide whether the served token should trigger an update.
///
/// Equal strings never trigger an update. With [`UpdatePolicy::AnyDifferent`]
/// every other token does, which lets the server roll devices back by
/// publishing an older version. [`UpdatePolicy::NewerOnly`] only accepts a
/// strictly newer dotted version and falls back to the difference rule when
/// either side does not parse.
pub fn decide(current: &str, token: &VersionToken, policy: UpdatePolicy) -> UpdateDecision {
    let current = current.trim();
    let server = token.as_str();

    if server == current {
        return UpdateDecision::UpToDate;
    }

    let available = UpdateDecision::Available {
        server: server.to_string(),
    };

    match policy {
        UpdatePolicy::AnyDifferent => available,
        UpdatePolicy::NewerOnly => match (Version::parse(current), Version::parse(server)) {
            (Some(running), Some(served)) if served > running => available,
            (Some(_), Some(_)) => UpdateDecision::UpToDate,
            _ => available,
        },
    }
}

/// Dotted numeric version, e.g. `v1.2.10` or `2.0.0-rc1`
#[derive(Debug, Clone)]
pub struct Version {
    parts: Vec<u32>,
    pre: Option<PreRelease>,
}

/// Pre-release suffix, ordered piece by piece: runs of digits compare
/// numerically, everything else lexically, so `rc10` ranks above `rc9`
#[derive(Debug, Clone)]
struct PreRelease {
    raw: String,
    pieces: Vec<PrePiece>,
}

// Variant order matters: a numeric piece ranks below a text piece
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PrePiece {
    Num(u64),
    Text(String),
}

impl PreRelease {
    fn parse(raw: &str) -> Option<Self> {
        let mut pieces = Vec::new();
        for ident in raw.split('.') {
            if ident.is_empty() {
                return None;
            }

            let mut rest = ident;
            while let Some(first) = rest.chars().next() {
                let digits = first.is_ascii_digit();
                let end = rest
                    .find(|c: char| c.is_ascii_digit() != digits)
                    .unwrap_or(rest.len());
                let (run, tail) = rest.split_at(end);
                pieces.push(if digits {
                    PrePiece::Num(run.parse().ok()?)
                } else {
                    PrePiece::Text(run.to_string())
                });
                rest = tail;
            }
        }

        Some(Self {
            raw: raw.to_string(),
            pieces,
        })
    }
}

impl Version {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);

        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(PreRelease::parse(pre)?)),
            Some(_) => return None,
            None => (s, None),
        };

        if core.is_empty() {
            return None;
        }

        let parts = core
            .split('.')
            .map(|p| {
                if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                    None
                } else {
                    p.parse::<u32>().ok()
                }
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self { parts, pre })
    }

    fn part(&self, idx: usize) -> u32 {
        self.parts.get(idx).copied().unwrap_or(0)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        for idx in 0..len {
            match self.part(idx).cmp(&other.part(idx)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }

        // A pre-release ranks below the bare release
        match (&self.pre, &other.pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.pieces.cmp(&b.pieces),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self
            .parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".");
        match &self.pre {
            Some(pre) => write!(f, "{}-{}", core, pre.raw),
            None => f.write_str(&core),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn token(s: &str) -> VersionToken {
        VersionToken::from_body(s.as_bytes()).unwrap()
    }

    #[test]
    fn test_equal_strings_do_not_trigger_update() {
        for policy in [UpdatePolicy::AnyDifferent, UpdatePolicy::NewerOnly] {
            assert_eq!(decide("1.0.0", &token("1.0.0"), policy), UpdateDecision::UpToDate);
        }
    }

    #[test]
    fn test_trailing_newline_is_ignored() {
        let t = token("1.0.0\r\n");
        assert_eq!(t.as_str(), "1.0.0");
        assert_eq!(decide("1.0.0", &t, UpdatePolicy::AnyDifferent), UpdateDecision::UpToDate);
    }

    #[test]
    fn test_empty_body_is_no_token() {
        assert!(VersionToken::from_body(b"").is_none());
        assert!(VersionToken::from_body(b"  \n\t").is_none());
        assert!(VersionToken::from_body(b"\0garbage").is_none());
    }

    #[test]
    fn test_body_is_truncated_to_buffer() {
        let body = "1".repeat(64);
        let t = VersionToken::from_body(body.as_bytes()).unwrap();
        assert_eq!(t.as_str().len(), MAX_TOKEN_LEN);
    }

    #[test]
    fn test_any_different_allows_downgrade() {
        let decision = decide("1.2.0", &token("1.1.0"), UpdatePolicy::AnyDifferent);
        assert_eq!(decision, UpdateDecision::Available { server: "1.1.0".into() });
    }

    #[test]
    fn test_newer_only_rejects_downgrade() {
        assert_eq!(
            decide("1.2.0", &token("1.1.9"), UpdatePolicy::NewerOnly),
            UpdateDecision::UpToDate
        );
        assert!(decide("1.2.0", &token("v1.10.0"), UpdatePolicy::NewerOnly).is_available());
    }

    #[test]
    fn test_newer_only_equal_after_padding() {
        // "1.2" and "1.2.0" are different strings but the same version
        assert_eq!(
            decide("1.2.0", &token("1.2"), UpdatePolicy::NewerOnly),
            UpdateDecision::UpToDate
        );
    }

    #[test]
    fn test_newer_only_falls_back_on_unparsable() {
        assert!(decide("1.0.0", &token("nightly"), UpdatePolicy::NewerOnly).is_available());
    }

    #[test]
    fn test_newer_only_orders_release_candidates_numerically() {
        assert_eq!(
            decide("2.0.0-rc10", &token("2.0.0-rc9"), UpdatePolicy::NewerOnly),
            UpdateDecision::UpToDate
        );
        assert!(decide("2.0.0-rc9", &token("2.0.0-rc10"), UpdatePolicy::NewerOnly).is_available());
        assert!(decide("2.0.0-rc10", &token("2.0.0"), UpdatePolicy::NewerOnly).is_available());
    }

    #[test]
    fn test_pre_release_pieces() {
        let v = |s| Version::parse(s).unwrap();
        assert!(v("1.0.0-beta.11") > v("1.0.0-beta.2"));
        assert!(v("1.0.0-beta") > v("1.0.0-alpha.1"));
        assert!(v("1.0.0-alpha.1") > v("1.0.0-alpha"));
        assert!(v("1.0.0-rc.1") > v("1.0.0-1"));
        assert_eq!(v("1.0.0-rc10").to_string(), "1.0.0-rc10");
        assert!(Version::parse("1.0.0-rc..1").is_none());
    }

    #[test]
    fn test_version_ordering() {
        let v = |s| Version::parse(s).unwrap();
        assert!(v("1.10.0") > v("1.9.3"));
        assert!(v("2.0.0") > v("2.0.0-rc1"));
        assert!(v("2.0.0-rc2") > v("2.0.0-rc1"));
        assert_eq!(v("V3"), v("3.0.0"));
        assert!(Version::parse("1..2").is_none());
        assert!(Version::parse("1.2-").is_none());
        assert!(Version::parse("").is_none());
    }

    proptest! {
        #[test]
        fn prop_newer_only_never_downgrades(
            a in proptest::collection::vec(0u32..50, 1..4),
            b in proptest::collection::vec(0u32..50, 1..4),
        ) {
            let join = |v: &Vec<u32>| v.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".");
            let current = join(&a);
            let served = join(&b);
            let decision = decide(&current, &token(&served), UpdatePolicy::NewerOnly);
            let newer = Version::parse(&served).unwrap() > Version::parse(&current).unwrap();
            prop_assert_eq!(decision.is_available(), newer);
        }

        #[test]
        fn prop_release_candidate_numbers_order_numerically(a in 0u32..1000, b in 0u32..1000) {
            let x = Version::parse(&format!("1.0.0-rc{}", a)).unwrap();
            let y = Version::parse(&format!("1.0.0-rc{}", b)).unwrap();
            prop_assert_eq!(x.cmp(&y), a.cmp(&b));
        }

        #[test]
        fn prop_token_has_no_surrounding_whitespace(body in proptest::collection::vec(any::<u8>(), 0..64)) {
            if let Some(t) = VersionToken::from_body(&body) {
                prop_assert!(!t.as_str().is_empty());
                prop_assert_eq!(t.as_str(), t.as_str().trim());
            }
        }
    }
}
