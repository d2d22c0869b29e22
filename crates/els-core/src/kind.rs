use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of template-addressable entities tracked by the registry.
///
/// The set is closed: every registry and usage operation is keyed by one of
/// these variants, so an "unknown kind" can only appear at a string boundary
/// (see [`EntityKind::from_str`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Transform,
    Helper,
    Component,
    RoutePath,
    Model,
    Service,
    Modifier,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Transform,
        EntityKind::Helper,
        EntityKind::Component,
        EntityKind::RoutePath,
        EntityKind::Model,
        EntityKind::Service,
        EntityKind::Modifier,
    ];

    /// Dense index into [`EntityKind::ALL`], used for array-backed tables.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            EntityKind::Transform => 0,
            EntityKind::Helper => 1,
            EntityKind::Component => 2,
            EntityKind::RoutePath => 3,
            EntityKind::Model => 4,
            EntityKind::Service => 5,
            EntityKind::Modifier => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Transform => "transform",
            EntityKind::Helper => "helper",
            EntityKind::Component => "component",
            EntityKind::RoutePath => "routePath",
            EntityKind::Model => "model",
            EntityKind::Service => "service",
            EntityKind::Modifier => "modifier",
        }
    }

    /// Only components and routes carry a template body worth indexing.
    pub const fn usage_kind(self) -> Option<UsageKind> {
        match self {
            EntityKind::Component => Some(UsageKind::Component),
            EntityKind::RoutePath => Some(UsageKind::RoutePath),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown registry kind `{0}`")]
pub struct ParseKindError(pub String);

impl FromStr for EntityKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseKindError(s.to_owned()))
    }
}

/// Subset of [`EntityKind`] that participates in template usage tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageKind {
    Component,
    RoutePath,
}

impl UsageKind {
    pub const ALL: [UsageKind; 2] = [UsageKind::Component, UsageKind::RoutePath];

    pub const fn entity_kind(self) -> EntityKind {
        match self {
            UsageKind::Component => EntityKind::Component,
            UsageKind::RoutePath => EntityKind::RoutePath,
        }
    }

    pub const fn as_str(self) -> &'static str {
        self.entity_kind().as_str()
    }
}

impl From<UsageKind> for EntityKind {
    fn from(kind: UsageKind) -> Self {
        kind.entity_kind()
    }
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
