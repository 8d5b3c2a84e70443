/// Every screen the client can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    /// Item list + detail panel
    #[default]
    Home,
    /// Stock summary
    Dashboard,
    /// Units currently checked out (admin)
    Manage,
    /// Slack toggle and manual sync (admin)
    Settings,
    Login,
}

impl Page {
    /// Pages reachable from the navigation bar, in order
    pub const MENU: [Page; 4] = [Page::Home, Page::Dashboard, Page::Manage, Page::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Início",
            Page::Dashboard => "Dashboard",
            Page::Manage => "Itens em Uso",
            Page::Settings => "Configurações",
            Page::Login => "Login",
        }
    }

    pub fn is_admin_only(&self) -> bool {
        match self {
            Page::Manage | Page::Settings => true,
            Page::Home | Page::Dashboard | Page::Login => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Shown(Page),
    /// Admin page requested without a session; the login page is shown instead
    RedirectedToLogin { wanted: Page },
}

/// Page state machine with the admin gate
#[derive(Debug, Default)]
pub struct Router {
    current: Page,
    after_login: Option<Page>,
}

impl Router {
    pub fn current(&self) -> Page {
        self.current
    }

    pub fn navigate(&mut self, page: Page, logged_in: bool) -> NavOutcome {
        if page.is_admin_only() && !logged_in {
            self.after_login = Some(page);
            self.current = Page::Login;
            return NavOutcome::RedirectedToLogin { wanted: page };
        }

        self.current = page;
        NavOutcome::Shown(page)
    }

    /// Where to go after a successful login: the page that bounced, or home
    pub fn take_after_login(&mut self) -> Page {
        self.after_login.take().unwrap_or(Page::Home)
    }

    /// Leaving an admin page once the session is gone
    pub fn on_logout(&mut self) {
        self.after_login = None;
        self.current = Page::Home;
    }

    pub fn next_menu_page(&self) -> Page {
        let pos = Page::MENU.iter().position(|p| *p == self.current);
        match pos {
            Some(pos) => Page::MENU[(pos + 1) % Page::MENU.len()],
            None => Page::Home,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_pages_always_show() {
        let mut router = Router::default();
        assert_eq!(router.navigate(Page::Dashboard, false), NavOutcome::Shown(Page::Dashboard));
        assert_eq!(router.current(), Page::Dashboard);
    }

    #[test]
    fn test_admin_page_redirects_when_logged_out() {
        let mut router = Router::default();
        assert_eq!(
            router.navigate(Page::Settings, false),
            NavOutcome::RedirectedToLogin { wanted: Page::Settings }
        );
        assert_eq!(router.current(), Page::Login);
        assert_eq!(router.take_after_login(), Page::Settings);
        assert_eq!(router.take_after_login(), Page::Home);
    }

    #[test]
    fn test_admin_page_shows_when_logged_in() {
        let mut router = Router::default();
        assert_eq!(router.navigate(Page::Manage, true), NavOutcome::Shown(Page::Manage));
    }

    #[test]
    fn test_menu_cycles() {
        let mut router = Router::default();
        assert_eq!(router.next_menu_page(), Page::Dashboard);
        router.navigate(Page::Settings, true);
        assert_eq!(router.next_menu_page(), Page::Home);
        router.navigate(Page::Login, false);
        assert_eq!(router.next_menu_page(), Page::Home);
    }
}
