use std::collections::HashSet;
use tracing::debug;
use crate::auth::AuthMode;

/// Top-level screens. At most one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Landing,
    Dashboard,
    Coach,
    Login,
}

impl Page {
    #[cfg(test)]
    pub fn all() -> [Page; 4] {
        [Page::Landing, Page::Dashboard, Page::Coach, Page::Login]
    }

    /// The persistent nav entry highlighted while this page is shown
    pub fn nav_link(&self) -> NavLink {
        match self {
            Page::Landing => NavLink::Home,
            Page::Dashboard => NavLink::Dashboard,
            Page::Coach => NavLink::Coach,
            Page::Login => NavLink::Login,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Landing => "Home",
            Page::Dashboard => "Dashboard",
            Page::Coach => "AI Coach",
            Page::Login => "Account",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavLink {
    Home,
    Dashboard,
    Coach,
    Login,
    Signup,
    GetStarted,
}

impl NavLink {
    /// Links rendered in the header, in display order
    pub fn header() -> [NavLink; 5] {
        [
            NavLink::Home,
            NavLink::Dashboard,
            NavLink::Coach,
            NavLink::Login,
            NavLink::Signup,
        ]
    }

    pub fn target(&self) -> Page {
        match self {
            NavLink::Home => Page::Landing,
            NavLink::Dashboard => Page::Dashboard,
            NavLink::Coach => Page::Coach,
            NavLink::Login | NavLink::Signup | NavLink::GetStarted => Page::Login,
        }
    }

    /// Auth tab to select after following the link, if any
    pub fn auth_mode(&self) -> Option<AuthMode> {
        match self {
            NavLink::Login => Some(AuthMode::Login),
            NavLink::Signup | NavLink::GetStarted => Some(AuthMode::Signup),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NavLink::Home => "Home",
            NavLink::Dashboard => "Dashboard",
            NavLink::Coach => "AI Coach",
            NavLink::Login => "Log In",
            NavLink::Signup => "Sign Up",
            NavLink::GetStarted => "Get Started",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            NavLink::Home => 'H',
            NavLink::Dashboard => 'D',
            NavLink::Coach => 'C',
            NavLink::Login => 'L',
            NavLink::Signup => 'S',
            NavLink::GetStarted => 'G',
        }
    }
}

/// Page visibility and nav highlighting
#[derive(Debug, Default)]
pub struct Navigator {
    visible: Option<Page>,
    active: HashSet<NavLink>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide every page and clear every highlight, then show `target` and
    /// highlight its nav link. `None` leaves everything hidden.
    pub fn show_page(&mut self, target: Option<Page>) {
        self.visible = None;
        self.active.clear();

        if let Some(page) = target {
            self.visible = Some(page);
            self.active.insert(page.nav_link());
        }

        debug!(page = ?target, "show page");
    }

    pub fn visible(&self) -> Option<Page> {
        self.visible
    }

    pub fn is_visible(&self, page: Page) -> bool {
        self.visible == Some(page)
    }

    pub fn is_active(&self, link: NavLink) -> bool {
        self.active.contains(&link)
    }

    #[cfg(test)]
    pub fn active_links(&self) -> impl Iterator<Item = &NavLink> {
        self.active.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_count(nav: &Navigator) -> usize {
        Page::all().iter().filter(|p| nav.is_visible(**p)).count()
    }

    #[test]
    fn test_show_page_shows_exactly_one() {
        let mut nav = Navigator::new();
        for page in Page::all() {
            nav.show_page(Some(page));
            assert_eq!(visible_count(&nav), 1);
            assert!(nav.is_visible(page));
            let active: Vec<_> = nav.active_links().copied().collect();
            assert_eq!(active, vec![page.nav_link()]);
        }
    }

    #[test]
    fn test_show_page_none_hides_everything() {
        let mut nav = Navigator::new();
        nav.show_page(Some(Page::Coach));
        nav.show_page(None);
        assert_eq!(visible_count(&nav), 0);
        assert_eq!(nav.active_links().count(), 0);
        assert_eq!(nav.visible(), None);
    }

    #[test]
    fn test_show_page_is_idempotent() {
        let mut once = Navigator::new();
        once.show_page(Some(Page::Dashboard));

        let mut twice = Navigator::new();
        twice.show_page(Some(Page::Dashboard));
        twice.show_page(Some(Page::Dashboard));

        assert_eq!(once.visible(), twice.visible());
        let a: HashSet<_> = once.active_links().copied().collect();
        let b: HashSet<_> = twice.active_links().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signup_links_do_not_get_their_own_highlight() {
        let mut nav = Navigator::new();
        nav.show_page(Some(NavLink::Signup.target()));
        assert!(nav.is_active(NavLink::Login));
        assert!(!nav.is_active(NavLink::Signup));
        assert!(!nav.is_active(NavLink::GetStarted));
    }

    #[test]
    fn test_link_auth_modes() {
        assert_eq!(NavLink::Login.auth_mode(), Some(AuthMode::Login));
        assert_eq!(NavLink::Signup.auth_mode(), Some(AuthMode::Signup));
        assert_eq!(NavLink::GetStarted.auth_mode(), Some(AuthMode::Signup));
        assert_eq!(NavLink::Coach.auth_mode(), None);
        assert_eq!(NavLink::GetStarted.target(), Page::Login);
    }
}
