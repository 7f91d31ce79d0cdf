//! Route table and per-destination access requirements.
//!
//! DESIGN
//! ======
//! The table is static and ordered: the first pattern that matches wins, so
//! literal segments (`/teams/create`) are listed before parameters
//! (`/teams/:id`). Unknown paths resolve to the public not-found route.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use crate::auth::Role;

/// What a destination demands of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteRequirement {
    pub requires_auth: bool,
    /// Empty means any role.
    pub allowed_roles: Vec<Role>,
}

impl RouteRequirement {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self { requires_auth: true, allowed_roles: Vec::new() }
    }

    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self { requires_auth: true, allowed_roles: roles.into_iter().collect() }
    }

    pub fn allows(&self, role: Option<&Role>) -> bool {
        self.allowed_roles.is_empty() || role.is_some_and(|r| self.allowed_roles.contains(r))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub name: &'static str,
    pub pattern: &'static str,
    pub requires_auth: bool,
    pub roles: &'static [&'static str],
}

impl RouteDef {
    pub fn requirement(&self) -> RouteRequirement {
        RouteRequirement {
            requires_auth: self.requires_auth,
            allowed_roles: self.roles.iter().filter_map(|r| Role::parse(r)).collect(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut pattern = segments(self.pattern);
        let mut path = segments(path);
        loop {
            match (pattern.next(), path.next()) {
                (None, None) => return true,
                (Some(p), Some(s)) if p.starts_with(':') || p == s => {}
                _ => return false,
            }
        }
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

const fn route(name: &'static str, pattern: &'static str, requires_auth: bool, roles: &'static [&'static str]) -> RouteDef {
    RouteDef { name, pattern, requires_auth, roles }
}

/// Query parameter carrying the post-login destination.
pub const REDIRECT_PARAM: &str = "redirect";

/// Fallback for paths no entry in [`ROUTES`] matches.
pub const NOT_FOUND: RouteDef = route("NotFound", "*", false, &[]);

pub const ROUTES: &[RouteDef] = &[
    route("Home", "/", true, &[]),
    route("Login", "/login", false, &[]),
    route("Register", "/register", false, &[]),
    route("Tournaments", "/tournaments", true, &[]),
    route("CreateTournament", "/tournaments/create", true, &["organizer"]),
    route("TournamentDetail", "/tournaments/:id", true, &[]),
    route("TournamentMatches", "/tournaments/:id/matches", true, &[]),
    route("EditTournament", "/tournaments/:id/edit", true, &["organizer"]),
    route("Matches", "/matches", true, &[]),
    route("MatchDetail", "/matches/:id", true, &[]),
    route("Teams", "/teams", true, &[]),
    route("CreateTeam", "/teams/create", true, &["player"]),
    route("TeamDetail", "/teams/:id", true, &[]),
    route("UserProfile", "/profile", true, &[]),
    route("MyInvitations", "/invitations", true, &["player"]),
];

pub fn match_route(path: &str) -> &'static RouteDef {
    ROUTES.iter().find(|r| r.matches(path)).unwrap_or(&NOT_FOUND)
}

/// A navigation target resolved against the route table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    /// Normalized path without query or fragment.
    pub path: String,
    /// Path plus query, as requested.
    pub full_path: String,
    pub name: &'static str,
    pub requirement: RouteRequirement,
}

impl Destination {
    pub fn resolve(full_path: &str) -> Self {
        let path = normalize_path(full_path);
        let route = match_route(&path);
        Self { path, full_path: full_path.to_owned(), name: route.name, requirement: route.requirement() }
    }

    /// A destination with explicit requirements, bypassing the table.
    pub fn with_requirement(full_path: &str, requirement: RouteRequirement) -> Self {
        Self { path: normalize_path(full_path), full_path: full_path.to_owned(), name: "", requirement }
    }
}

/// Strip query and fragment, collapse the trailing slash. Empty is `/`.
pub fn normalize_path(full_path: &str) -> String {
    let end = full_path.find(['?', '#']).unwrap_or(full_path.len());
    let path = full_path[..end].trim_end_matches('/');
    if path.is_empty() {
        "/".to_owned()
    } else if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Decoded value of query parameter `name` in `full_path`.
pub fn query_param(full_path: &str, name: &str) -> Option<String> {
    let query = full_path.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or_default();
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != name {
            return None;
        }
        match urlencoding::decode(&value.replace('+', " ")) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(_) => None,
        }
    })
}

/// Same-origin absolute path, safe to use as a post-login redirect.
pub fn is_internal_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
