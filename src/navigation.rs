//! This file defines the navigation bar shown at the top of every signed-in page.

use maud::{Markup, html};

use crate::{auth::Access, endpoints};

/// A link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar for a visitor with `access`.
    ///
    /// Staff get a link to the view password page. If a link matches
    /// `active_endpoint`, then that link will be marked as active and
    /// displayed differently in the HTML.
    pub fn new(active_endpoint: &str, access: Access) -> NavBar<'_> {
        let mut links = vec![Link {
            url: endpoints::DASHBOARD_VIEW,
            title: "Dashboard",
            is_current: active_endpoint == endpoints::DASHBOARD_VIEW,
        }];

        if access.is_staff {
            links.push(Link {
                url: endpoints::VIEW_PASSWORDS_VIEW,
                title: "Passwords",
                is_current: active_endpoint == endpoints::VIEW_PASSWORDS_VIEW,
            });
        }

        if access.has_view_access() {
            links.push(Link {
                url: endpoints::LOG_OUT,
                title: "Log out",
                is_current: false,
            });
        } else {
            links.push(Link {
                url: endpoints::LOG_IN_VIEW,
                title: "Log in",
                is_current: active_endpoint == endpoints::LOG_IN_VIEW,
            });
        }

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::DASHBOARD_VIEW)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Family Expenses"
                        }
                    }

                    ul
                        class="font-medium flex flex-row space-x-4 lg:space-x-8
                        rtl:space-x-reverse"
                    {
                        @for link in self.links {
                            li { (link.into_html()) }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use crate::{auth::Access, endpoints, navigation::NavBar};

    fn staff() -> Access {
        Access {
            user_id: None,
            view_access: true,
            is_staff: true,
        }
    }

    fn viewer() -> Access {
        Access {
            user_id: None,
            view_access: true,
            is_staff: false,
        }
    }

    fn urls(nav_bar: &NavBar<'_>) -> Vec<String> {
        nav_bar.links.iter().map(|link| link.url.to_owned()).collect()
    }

    #[test]
    fn staff_see_password_link() {
        let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW, staff());

        assert_eq!(
            urls(&nav_bar),
            vec![
                endpoints::DASHBOARD_VIEW,
                endpoints::VIEW_PASSWORDS_VIEW,
                endpoints::LOG_OUT
            ]
        );
    }

    #[test]
    fn viewers_do_not_see_password_link() {
        let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW, viewer());

        assert_eq!(
            urls(&nav_bar),
            vec![endpoints::DASHBOARD_VIEW, endpoints::LOG_OUT]
        );
    }

    #[test]
    fn anonymous_visitors_see_log_in_link() {
        let nav_bar = NavBar::new(endpoints::LOG_IN_VIEW, Access::default());

        assert_eq!(
            urls(&nav_bar),
            vec![endpoints::DASHBOARD_VIEW, endpoints::LOG_IN_VIEW]
        );
    }

    #[test]
    fn set_active_endpoint() {
        for endpoint in [endpoints::DASHBOARD_VIEW, endpoints::VIEW_PASSWORDS_VIEW] {
            let nav_bar = NavBar::new(endpoint, staff());

            for link in nav_bar.links {
                assert_eq!(
                    link.is_current,
                    link.url == endpoint,
                    "got is_current={} for link {} on page {}",
                    link.is_current,
                    link.url,
                    endpoint
                );
            }
        }
    }
}
