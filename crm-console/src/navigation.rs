//! Sidebar model and route matching.

use std::collections::BTreeMap;

use crm_config::Configuration;
use serde::Serialize;

/// Top-level sections in sidebar order: (label, route).
const NAV_ITEMS: [(&str, &str); 8] = [
    ("Dashboard", "/"),
    ("Customers", "/customers"),
    ("Quotes", "/quotes"),
    ("Sales Orders", "/sales-orders"),
    ("Invoices", "/invoices"),
    ("Purchase Orders", "/purchase-orders"),
    ("Projects", "/projects"),
    ("Products", "/products"),
];

/// Route table: (page name, pattern). Literal routes come before parameterised
/// routes sharing a prefix.
const ROUTES: &[(&str, &str)] = &[
    ("dashboard", "/"),
    ("customers", "/customers"),
    ("customer-detail", "/customers/:id"),
    ("quotes", "/quotes"),
    ("quote-create", "/quotes/create"),
    ("quote-detail", "/quotes/:id"),
    ("sales-orders", "/sales-orders"),
    ("sales-order-detail", "/sales-orders/:id"),
    ("invoices", "/invoices"),
    ("invoice-detail", "/invoices/:id"),
    ("purchase-orders", "/purchase-orders"),
    ("purchase-order-detail", "/purchase-orders/:id"),
    ("projects", "/projects"),
    ("project-detail", "/projects/:id"),
    ("products", "/products"),
    ("customization", "/customization"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub route: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sidebar {
    /// Configured company name.
    pub title: String,
    pub background: String,
    pub accent: String,
    pub items: Vec<NavItem>,
}

impl Sidebar {
    /// Build the sidebar for `current_path`. An item is active when the path is
    /// its route or lies below it; the dashboard only matches `/` exactly.
    pub fn build(config: &Configuration, current_path: &str) -> Self {
        let path = normalize(current_path);
        let items = NAV_ITEMS
            .iter()
            .map(|(label, route)| NavItem {
                label: (*label).to_string(),
                route: (*route).to_string(),
                active: if *route == "/" {
                    path == "/"
                } else {
                    path == *route || path.starts_with(&format!("{route}/"))
                },
            })
            .collect();
        Self {
            title: config.general.company_name.clone(),
            background: config.theme.sidebar.clone(),
            accent: config.theme.primary.clone(),
            items,
        }
    }
}

/// A resolved route: the page name plus captured `:param` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub page: &'static str,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Resolve a path against the route table. Trailing slashes and query strings
/// are ignored.
pub fn match_route(path: &str) -> Option<RouteMatch> {
    let path = normalize(path);
    let segments: Vec<&str> = split(&path);
    ROUTES.iter().find_map(|&(page, pattern)| {
        let pattern_segments = split(pattern);
        if pattern_segments.len() != segments.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (expected, actual) in pattern_segments.iter().zip(&segments) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), (*actual).to_string());
                }
                None if expected == actual => {}
                None => return None,
            }
        }
        Some(RouteMatch { page, params })
    })
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_lists_sections_in_order() {
        let sidebar = Sidebar::build(&Configuration::default(), "/");
        let labels: Vec<_> = sidebar.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Dashboard",
                "Customers",
                "Quotes",
                "Sales Orders",
                "Invoices",
                "Purchase Orders",
                "Projects",
                "Products"
            ]
        );
        assert_eq!(sidebar.title, "CRM System");
        assert_eq!(sidebar.background, "#2a3042");
    }

    #[test]
    fn sidebar_follows_configuration() {
        let mut config = Configuration::default();
        config.general.company_name = "Acme".into();
        config.theme.sidebar = "#000".into();
        let sidebar = Sidebar::build(&config, "/");
        assert_eq!(sidebar.title, "Acme");
        assert_eq!(sidebar.background, "#000");
    }

    #[test]
    fn active_item_tracks_path() {
        let sidebar = Sidebar::build(&Configuration::default(), "/quotes/create");
        let active: Vec<_> = sidebar
            .items
            .iter()
            .filter(|i| i.active)
            .map(|i| i.label.as_str())
            .collect();
        assert_eq!(active, vec!["Quotes"]);

        let sidebar = Sidebar::build(&Configuration::default(), "/");
        assert!(sidebar.items[0].active);
        assert!(sidebar.items[1..].iter().all(|i| !i.active));
    }

    #[test]
    fn literal_routes_win_over_params() {
        assert_eq!(match_route("/quotes/create").unwrap().page, "quote-create");
        let quote = match_route("/quotes/17").unwrap();
        assert_eq!(quote.page, "quote-detail");
        assert_eq!(quote.param("id"), Some("17"));
    }

    #[test]
    fn captures_ids_and_normalizes() {
        let customer = match_route("/customers/42/?tab=notes").unwrap();
        assert_eq!(customer.page, "customer-detail");
        assert_eq!(customer.param("id"), Some("42"));
        assert_eq!(match_route("").unwrap().page, "dashboard");
        assert_eq!(match_route("sales-orders").unwrap().page, "sales-orders");
    }

    #[test]
    fn unknown_paths_do_not_match() {
        assert!(match_route("/customers/42/edit").is_none());
        assert!(match_route("/reports").is_none());
    }
}
