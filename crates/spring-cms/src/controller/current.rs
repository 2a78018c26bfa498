// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use crate::component::SharedComponent;
use crate::request::CmsRequest;
use crate::router::Params;
use crate::theme::Theme;
use crate::view::View;

/// Request-scoped rendering context.
///
/// Partials render against a copy: the maps are cloned, views and
/// components are shared, and the saved value is put back afterwards.
#[derive(Clone)]
pub struct Current {
    /// The request being served.
    pub request: Arc<CmsRequest>,
    /// Active theme.
    pub theme: Arc<dyn Theme>,
    /// Resolved page.
    pub page: Arc<View>,
    /// Layout wrapping the page, if any.
    pub layout: Option<Arc<View>>,
    /// Parameters captured by the route.
    pub route_params: Params,
    /// Call-site parameters passed to partials.
    pub params: HashMap<String, String>,
    /// Every component instantiated so far, by alias.
    pub components: HashMap<String, SharedComponent>,
    /// Component owning the partial being rendered.
    pub this: Option<SharedComponent>,
}

impl Current {
    /// Context for a freshly resolved page.
    pub fn new(
        request: Arc<CmsRequest>,
        theme: Arc<dyn Theme>,
        page: Arc<View>,
        layout: Option<Arc<View>>,
        route_params: Params,
    ) -> Self {
        Self {
            request,
            theme,
            page,
            layout,
            route_params,
            params: HashMap::new(),
            components: HashMap::new(),
            this: None,
        }
    }

    /// The working copy a partial renders against: same state, call-site
    /// parameters merged in, no owning component.
    pub fn for_partial<I>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut copy = self.clone();
        copy.this = None;
        copy.params.extend(params);
        copy
    }
}

impl std::fmt::Debug for Current {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut components: Vec<&String> = self.components.keys().collect();
        components.sort();
        f.debug_struct("Current")
            .field("path", &self.request.path)
            .field("page", &self.page.name())
            .field("layout", &self.layout.as_ref().map(|l| l.name().to_string()))
            .field("route_params", &self.route_params)
            .field("params", &self.params)
            .field("components", &components)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentDetails, ComponentInstance, Properties};
    use crate::theme::MemoryTheme;
    use crate::view::ViewKind;

    struct Marker;

    impl Component for Marker {
        fn details(&self) -> ComponentDetails {
            ComponentDetails::new("marker", "Marker")
        }
    }

    #[test]
    fn test_for_partial_copies_maps() {
        let page = Arc::new(View::parse(ViewKind::Page, "home", "").unwrap());
        let mut current = Current::new(
            Arc::new(CmsRequest::default()),
            Arc::new(MemoryTheme::new("demo")),
            page,
            None,
            Params::new(),
        );
        current.params.insert("a".into(), "1".into());
        let marker = ComponentInstance::new(Marker, Properties::new()).into_shared();
        current.this = Some(marker.clone());
        current.components.insert("marker".into(), marker);

        let mut copy = current.for_partial(vec![("b".to_string(), "2".to_string())]);
        copy.params.insert("a".into(), "changed".into());
        copy.components.clear();

        assert!(copy.this.is_none());
        assert_eq!(copy.params.get("b").map(String::as_str), Some("2"));
        assert_eq!(current.params.get("a").map(String::as_str), Some("1"));
        assert!(!current.params.contains_key("b"));
        assert_eq!(current.components.len(), 1);
        assert!(current.this.is_some());
    }
}
