use std::rc::Rc;

use leptos_router::{use_navigate, NavigateOptions};

use super::storage::window;

/// Client-side navigation handle shared through context.
#[derive(Clone)]
pub struct Navigator(Rc<dyn Fn(&str)>);

impl Navigator {
    pub fn new(navigate: impl Fn(&str) + 'static) -> Self {
        Self(Rc::new(navigate))
    }

    /// Must be called below `<Router>`.
    pub fn router() -> Self {
        let navigate = use_navigate();
        Self::new(move |path| navigate(path, NavigateOptions::default()))
    }

    /// Full page load through `window.location`, for code outside the router.
    pub fn location() -> Self {
        Self::new(|path| match window() {
            Ok(win) => {
                if win.location().set_href(path).is_err() {
                    log::error!("Failed to navigate to {}", path);
                }
            }
            Err(err) => log::error!("Cannot navigate to {}: {}", path, err),
        })
    }

    pub fn navigate(&self, path: &str) {
        (self.0)(path);
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Navigator")
    }
}
