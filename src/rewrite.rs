//! URL rewrites applied, in registration order, before handler selection.

use crate::request::Request;

/// A rewrite is a predicate over the request plus an effect that mutates
/// its path when the predicate accepts. Both halves are boxed closures so
/// a server can register arbitrary logic without a trait per rewrite.
pub struct Rewrite {
    filter: Box<dyn Fn(&Request) -> bool>,
    apply: Box<dyn Fn(&mut Request)>,
}

impl Rewrite {
    pub fn new(
        filter: impl Fn(&Request) -> bool + 'static,
        apply: impl Fn(&mut Request) + 'static,
    ) -> Rewrite {
        Rewrite { filter: Box::new(filter), apply: Box::new(apply) }
    }

    /// A rewrite that unconditionally maps one exact path to another.
    pub fn exact(from: impl Into<String>, to: impl Into<String>) -> Rewrite {
        let from = from.into();
        let to = to.into();
        Rewrite::new(
            move |req| req.path() == from,
            move |req| req.set_path(to.clone()),
        )
    }

    pub fn apply_if_matched(&self, request: &mut Request) {
        if (self.filter)(request) {
            (self.apply)(request);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enums::Version;
    use crate::request::Request;

    #[test]
    fn exact_rewrite_replaces_matching_path() {
        let mut req = Request::new(Version::Http11);
        req.set_path("/old".to_string());
        let rw = Rewrite::exact("/old", "/new");
        rw.apply_if_matched(&mut req);
        assert_eq!(req.path(), "/new");
    }

    #[test]
    fn non_matching_path_is_untouched() {
        let mut req = Request::new(Version::Http11);
        req.set_path("/keep".to_string());
        let rw = Rewrite::exact("/old", "/new");
        rw.apply_if_matched(&mut req);
        assert_eq!(req.path(), "/keep");
    }
}
