use super::account::{Profile, Role};
use super::session::IdentityUser;

pub const LANDING_PATH: &str = "/";
pub const REGISTER_PATH: &str = "/register";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(String),
}

/// Decides whether a page guarded by `required` may render.
///
/// Pages with no role requirement only need a signed-in, registered user.
pub fn route_guard(
    required: Option<Role>,
    identity: Option<&IdentityUser>,
    profile: Option<&Profile>,
) -> RouteDecision {
    if identity.is_none() {
        return RouteDecision::Redirect(LANDING_PATH.to_string());
    }
    let Some(profile) = profile else {
        return RouteDecision::Redirect(REGISTER_PATH.to_string());
    };
    match required {
        Some(role) if role != profile.role() => {
            RouteDecision::Redirect(profile.role().home_path().to_string())
        }
        _ => RouteDecision::Allow,
    }
}
