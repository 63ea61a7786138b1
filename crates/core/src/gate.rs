//! Progress gate: decides which screen a student may see.
//!
//! The gate is a pure decision function; the application shell applies the
//! returned redirect. It must be re-evaluated synchronously on every
//! navigation request and every user-record change.

use std::fmt;

use crate::model::{UserRecord, progress};

/// The screens a student can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Register,
    Login,
    Profile,
    DomainSelect,
    Checklist,
    AptitudeTest,
    DomainTest,
    OnlineReport,
    Dashboard,
}

impl Screen {
    /// Registration and login are reachable without a signed-in user;
    /// everything else sits behind the gate.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        !matches!(self, Screen::Register | Screen::Login)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Register => "register",
            Screen::Login => "login",
            Screen::Profile => "profile",
            Screen::DomainSelect => "select-role",
            Screen::Checklist => "checklist",
            Screen::AptitudeTest => "aptitude",
            Screen::DomainTest => "domain",
            Screen::OnlineReport => "online-result",
            Screen::Dashboard => "dashboard",
        };
        f.write_str(name)
    }
}

/// Outcome of evaluating the gate for one navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(Screen),
}

/// Evaluates the gate rules in order; the first match wins.
///
/// 1. Public screens are always allowed.
/// 2. No signed-in user: everything else redirects to login.
/// 3. Profile incomplete: every screen but the profile form redirects there.
/// 4. Domain already chosen: the selection screen redirects to the checklist
///    hub, so a domain cannot be picked twice.
/// 5. Otherwise the request is allowed.
#[must_use]
pub fn evaluate(user: Option<&UserRecord>, requested: Screen) -> RouteDecision {
    if !requested.requires_auth() {
        return RouteDecision::Allow;
    }

    let Some(user) = user else {
        return RouteDecision::Redirect(Screen::Login);
    };

    if !user.profile_completed() && requested != Screen::Profile {
        return RouteDecision::Redirect(Screen::Profile);
    }

    if user.profile_completed() && user.domain_chosen() && requested == Screen::DomainSelect {
        return RouteDecision::Redirect(Screen::Checklist);
    }

    RouteDecision::Allow
}

/// Post-login dispatch, run once when a login response arrives.
///
/// Distinct from the gate: it picks the first incomplete stage by progress
/// threshold. The checklist hub is terminal; the full dashboard is only
/// reached by explicit navigation from the hub.
#[must_use]
pub fn initial_screen(user: &UserRecord) -> Screen {
    let pct = user.progress_percent();
    if pct < progress::PROFILE_DONE {
        Screen::Profile
    } else if pct < progress::DOMAIN_CHOSEN {
        Screen::DomainSelect
    } else {
        Screen::Checklist
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DomainCategory, StudentId, UserUpdate};

    fn user_at(pct: u8, profile_completed: bool) -> UserRecord {
        UserRecord::new(
            StudentId::new("s1"),
            "Ravi",
            "ravi@college.edu",
            profile_completed,
            pct,
        )
    }

    const AUTHED_SCREENS: [Screen; 7] = [
        Screen::Profile,
        Screen::DomainSelect,
        Screen::Checklist,
        Screen::AptitudeTest,
        Screen::DomainTest,
        Screen::OnlineReport,
        Screen::Dashboard,
    ];

    #[test]
    fn signed_out_requests_redirect_to_login() {
        for screen in AUTHED_SCREENS {
            assert_eq!(
                evaluate(None, screen),
                RouteDecision::Redirect(Screen::Login)
            );
        }
        assert_eq!(evaluate(None, Screen::Login), RouteDecision::Allow);
        assert_eq!(evaluate(None, Screen::Register), RouteDecision::Allow);
    }

    #[test]
    fn incomplete_profile_forces_profile_screen() {
        let user = user_at(0, false);
        for screen in AUTHED_SCREENS {
            let expected = if screen == Screen::Profile {
                RouteDecision::Allow
            } else {
                RouteDecision::Redirect(Screen::Profile)
            };
            assert_eq!(evaluate(Some(&user), screen), expected, "{screen}");
        }
    }

    #[test]
    fn chosen_domain_cannot_be_rechosen() {
        let mut user = user_at(20, true);
        user.merge(UserUpdate::domain_chosen(DomainCategory::Coding, "AI/ML"));

        assert_eq!(
            evaluate(Some(&user), Screen::DomainSelect),
            RouteDecision::Redirect(Screen::Checklist)
        );
        assert_eq!(evaluate(Some(&user), Screen::Checklist), RouteDecision::Allow);
    }

    #[test]
    fn domain_selection_allowed_before_choice() {
        let user = user_at(20, true);
        assert_eq!(
            evaluate(Some(&user), Screen::DomainSelect),
            RouteDecision::Allow
        );
    }

    #[test]
    fn login_dispatch_follows_progress_thresholds() {
        assert_eq!(initial_screen(&user_at(15, false)), Screen::Profile);
        assert_eq!(initial_screen(&user_at(25, true)), Screen::DomainSelect);
        assert_eq!(initial_screen(&user_at(45, true)), Screen::Checklist);
        assert_eq!(initial_screen(&user_at(100, true)), Screen::Checklist);
    }
}
