//! Access tiers and routes for backend operations.
//!
//! Every request the client can issue declares its HTTP route and the least
//! entitlement that may issue it. Views consult the tier before touching the
//! network so a free session never sends a premium-only request.

use serde::{Deserialize, Serialize};

#[cfg(feature = "derive")]
pub use shield_access_derive::Gated;

/// Access required by an operation.
/// Ordered by increasing strictness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Needs a session (a bearer token is attached).
    Authenticated,
    /// Needs a paid subscription.
    Premium,
}

/// What the current session holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Entitlement {
    #[default]
    Anonymous,
    Free,
    Premium,
}

impl Entitlement {
    pub fn from_flags(signed_in: bool, premium: bool) -> Self {
        match (signed_in, premium) {
            (_, true) => Entitlement::Premium,
            (true, false) => Entitlement::Free,
            (false, false) => Entitlement::Anonymous,
        }
    }

    /// Does this entitlement allow an operation requiring `access`?
    pub fn permits(&self, access: Access) -> bool {
        match access {
            Access::Public => true,
            Access::Authenticated => !matches!(self, Entitlement::Anonymous),
            Access::Premium => matches!(self, Entitlement::Premium),
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, Entitlement::Premium)
    }
}

impl Access {
    /// Message shown when an entitlement falls short of this tier.
    pub fn denial_message(&self) -> &'static str {
        match self {
            Access::Public => "",
            Access::Authenticated => "Sign in to continue.",
            Access::Premium => {
                "Category-level insights require a premium subscription. Upgrade to access detailed analysis."
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A backend route together with the access tier it needs.
///
/// Usually derived:
///
/// ```ignore
/// #[derive(Gated)]
/// #[access(Premium)]
/// #[route(GET, "/dashboard/category/{category}")]
/// struct CategoryRequest { category: Category }
/// ```
///
/// Placeholders in the path name fields of the struct and are filled in
/// with their `Display` output.
pub trait Gated {
    const METHOD: Method;

    fn access(&self) -> Access;

    /// Path below the API base, starting with `/`.
    fn path(&self) -> String;

    fn permitted_for(&self, entitlement: Entitlement) -> bool {
        entitlement.permits(self.access())
    }
}
