// src/policy/auth.rs
// =============================================================================
// This module recognizes "auth walls": pages that exist but only answer
// properly to a logged-in browser.
//
// GitHub is the classic case. /orgs/acme/teams, /settings/profile or a
// private repo all answer 404 to an anonymous request, which is
// indistinguishable from a page that really is gone. When the heuristic is
// switched on we resolve that ambiguity towards "skip": a CI job should not
// fail because somebody linked their org's team page.
//
// Like the exclusion policy this is data: a list of hosts, a list of path
// shapes, and the status codes that are ambiguous on those hosts.
//
// Path shapes are written segment by segment:
//   "*"  matches exactly one segment
//   "**" matches whatever is left (zero or more segments)
// =============================================================================

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Any,
    Rest,
}

/// A structured path pattern such as `/orgs/*/teams/**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "*" => Segment::Any,
                "**" => Segment::Rest,
                literal => Segment::Literal(literal.to_ascii_lowercase()),
            })
            .collect();
        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match_segments(&self.segments, &parts)
    }
}

fn match_segments(pattern: &[Segment], parts: &[&str]) -> bool {
    match (pattern.first(), parts.first()) {
        (None, None) => true,
        (Some(Segment::Rest), _) => true,
        (Some(_), None) | (None, Some(_)) => false,
        (Some(Segment::Any), Some(_)) => match_segments(&pattern[1..], &parts[1..]),
        (Some(Segment::Literal(lit)), Some(part)) => {
            lit.eq_ignore_ascii_case(part) && match_segments(&pattern[1..], &parts[1..])
        }
    }
}

/// Decides whether a failed-looking response is really an auth wall.
#[derive(Debug, Clone)]
pub struct AuthHeuristic {
    hosts: Vec<String>,
    login_only_paths: Vec<PathPattern>,
    ambiguous_statuses: Vec<u16>,
}

impl AuthHeuristic {
    pub fn new(hosts: Vec<String>, login_only_paths: Vec<PathPattern>, ambiguous_statuses: Vec<u16>) -> Self {
        Self {
            hosts,
            login_only_paths,
            ambiguous_statuses,
        }
    }

    /// The GitHub rule set.
    pub fn github() -> Self {
        let paths = [
            "/orgs/*/teams/**",
            "/orgs/*/settings/**",
            "/orgs/*/people/**",
            "/organizations/**",
            "/settings/**",
            "/notifications/**",
            "/enterprises/**",
            "/*/*/settings/**",
            "/*/*/security/**",
            "/*/*/pulse/**",
            "/*/*/graphs/**",
        ];
        Self::new(
            vec!["github.com".to_string()],
            paths.iter().map(|p| PathPattern::parse(p)).collect(),
            vec![403, 404],
        )
    }

    /// True if `url` answered `status` because of a login wall rather than
    /// because it is gone. Successful responses are never reclassified.
    pub fn should_skip(&self, url: &str, status: u16) -> bool {
        if (200..300).contains(&status) {
            return false;
        }
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if !self.is_platform_host(parsed.host_str()) {
            return false;
        }
        self.ambiguous_statuses.contains(&status)
            || self.login_only_paths.iter().any(|p| p.matches(parsed.path()))
    }

    fn is_platform_host(&self, host: Option<&str>) -> bool {
        let Some(host) = host else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        self.hosts.iter().any(|h| h == host)
    }
}

impl Default for AuthHeuristic {
    fn default() -> Self {
        Self::github()
    }
}
