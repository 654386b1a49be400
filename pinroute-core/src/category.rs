//! Named, togglable groupings of location points.
//!
//! Categories are implicit: the set holds exactly the names currently used by
//! at least one point, plus [`DEFAULT_CATEGORY`], which survives even when it
//! has no members.

/// Category assigned when the caller does not name one.
pub const DEFAULT_CATEGORY: &str = "default";

/// Normalise a user-supplied category name.
///
/// Surrounding whitespace is trimmed and the name is lower-cased; an empty
/// name maps to [`DEFAULT_CATEGORY`].
///
/// # Examples
/// ```
/// use pinroute_core::normalise_category;
///
/// assert_eq!(normalise_category("  Cafes "), "cafes");
/// assert_eq!(normalise_category("   "), "default");
/// ```
#[must_use]
pub fn normalise_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_owned()
    } else {
        trimmed.to_lowercase()
    }
}

/// A category name with its visibility toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    enabled: bool,
}

impl Category {
    fn new(name: String) -> Self {
        Self {
            name,
            enabled: true,
        }
    }

    /// Category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether points in this category are currently visible.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether this is the [`DEFAULT_CATEGORY`].
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_CATEGORY
    }
}

/// Ordered set of categories in order of first appearance.
///
/// The default category is always present and always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    entries: Vec<Category>,
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            entries: vec![Category::new(DEFAULT_CATEGORY.to_owned())],
        }
    }
}

impl CategorySet {
    /// Look up a category by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.entries.iter().find(|category| category.name == name)
    }

    /// Whether the named category exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether the named category exists and is enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(Category::enabled)
    }

    /// Iterate categories in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.entries.iter()
    }

    /// Number of categories, including the default.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: the default category is never removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `name` as an enabled category unless it already exists.
    ///
    /// Returns `true` when a new category was created.
    pub(crate) fn ensure(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push(Category::new(name.to_owned()));
        true
    }

    /// Set the enabled flag, returning `true` when the flag changed.
    pub(crate) fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|category| category.name == name) {
            Some(category) if category.enabled != enabled => {
                category.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    /// Drop a category unless it is the default.
    ///
    /// Returns `true` when a category was removed.
    pub(crate) fn prune(&mut self, name: &str) -> bool {
        if name == DEFAULT_CATEGORY {
            return false;
        }
        let before = self.entries.len();
        self.entries.retain(|category| category.name != name);
        self.entries.len() != before
    }

    /// Remove every category except the default, re-enabling it.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
