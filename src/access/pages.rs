use super::permission::{Action, Permission, PermissionSet};
use crate::entity::{
    Blog, BlogCategory, Destination, FeeTax, FileEntry, FoodMenu, Resource, Room, RoomCategory,
    RoomRate,
};

/// A guarded dashboard page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRoute {
    /// Route pattern; `{name}` segments match any single segment.
    pub path: String,
    pub title: String,
    pub required: PermissionSet,
    /// Where sessions lacking `required` are sent.
    pub redirect: String,
}

impl PageRoute {
    pub fn new(
        path: impl Into<String>,
        title: impl Into<String>,
        required: PermissionSet,
        redirect: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            required,
            redirect: redirect.into(),
        }
    }

    /// Returns the number of literal segments matched, or `None`.
    fn match_score(&self, path: &str) -> Option<usize> {
        let pattern: Vec<&str> = segments(&self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut literal = 0;
        for (expected, got) in pattern.iter().zip(&actual) {
            if expected.starts_with('{') && expected.ends_with('}') {
                continue;
            }
            if expected != got {
                return None;
            }
            literal += 1;
        }
        Some(literal)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Table of every guarded page.
#[derive(Debug, Clone, Default)]
pub struct PageCatalog {
    routes: Vec<PageRoute>,
}

impl PageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the property-management dashboard.
    pub fn dashboard() -> Self {
        let mut catalog = Self::new();
        catalog.push(PageRoute::new("/", "Dashboard", PermissionSet::new(), "/login"));
        catalog.push_resource::<Room>("Rooms");
        catalog.push_resource::<RoomCategory>("Room Categories");
        catalog.push_resource::<RoomRate>("Room Rates");
        catalog.push_resource::<FoodMenu>("Food Menu");
        catalog.push_resource::<Blog>("Blogs");
        catalog.push_resource::<BlogCategory>("Blog Categories");
        catalog.push_resource::<Destination>("Destinations");
        catalog.push_resource::<FeeTax>("Fees & Taxes");
        catalog.push_resource::<FileEntry>("File Manager");
        catalog.push(PageRoute::new("/users", "Users", PermissionSet::admin(), "/"));
        catalog.push(PageRoute::new("/settings", "Settings", PermissionSet::admin(), "/"));
        catalog
    }

    pub fn push(&mut self, route: PageRoute) {
        self.routes.push(route);
    }

    /// Adds list, detail, create and edit pages for `R`.
    pub fn push_resource<R: Resource>(&mut self, title: &str) {
        let list = format!("/{}", R::KIND);
        let require = |action| -> PermissionSet { [Permission::of::<R>(action)].into() };

        self.push(PageRoute::new(&list, title, require(Action::Read), "/"));
        self.push(PageRoute::new(
            format!("{list}/new"),
            format!("New {title}"),
            require(Action::Create),
            &list,
        ));
        self.push(PageRoute::new(
            format!("{list}/{{id}}"),
            title,
            require(Action::Read),
            &list,
        ));
        self.push(PageRoute::new(
            format!("{list}/{{id}}/edit"),
            format!("Edit {title}"),
            require(Action::Update),
            &list,
        ));
    }

    pub fn routes(&self) -> &[PageRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the route for a concrete path, preferring literal segments over
    /// `{param}` segments (`/rooms/new` beats `/rooms/{id}`).
    pub fn find(&self, path: &str) -> Option<&PageRoute> {
        self.routes
            .iter()
            .filter_map(|route| route.match_score(path).map(|score| (score, route)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, route)| route)
    }
}
