//! Cookie categories and the per-category preference set.

use serde::{Deserialize, Serialize};

/// Cookie categories a visitor can consent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Necessary,
    Functional,
    Analytics,
    Performance,
    Advertising,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Self::Necessary,
            Self::Functional,
            Self::Analytics,
            Self::Performance,
            Self::Advertising,
        ]
    }

    /// Key used in the persisted record.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Necessary => "necessary",
            Self::Functional => "functional",
            Self::Analytics => "analytics",
            Self::Performance => "performance",
            Self::Advertising => "advertising",
        }
    }

    /// Whether the category is always on.
    pub fn required(&self) -> bool {
        matches!(self, Self::Necessary)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Necessary => "Essential Cookies",
            Self::Functional => "Functional Cookies",
            Self::Analytics => "Analytics Cookies",
            Self::Performance => "Performance Cookies",
            Self::Advertising => "Marketing Cookies",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Necessary => {
                "Essential for the website to function: basic functionality, security \
                 features and remembering your cookie preferences. They cannot be disabled."
            }
            Self::Functional => {
                "Enable enhanced functionality such as remembering your language, \
                 region settings and personalised content."
            }
            Self::Analytics => {
                "Help us understand how visitors interact with the website by collecting \
                 and reporting information anonymously."
            }
            Self::Performance => {
                "Monitor technical performance so the website runs smoothly and loads quickly."
            }
            Self::Advertising => {
                "Deliver relevant advertisements and measure the effectiveness of \
                 marketing campaigns across platforms."
            }
        }
    }

    pub fn examples(&self) -> &'static [&'static str] {
        match self {
            Self::Necessary => &[
                "Session cookies",
                "Security tokens",
                "Load balancing",
                "Basic functionality",
            ],
            Self::Functional => &[
                "Language preferences",
                "Region settings",
                "Customized content",
                "User interface preferences",
            ],
            Self::Analytics => &[
                "Page views",
                "User interactions",
                "Site performance",
                "Traffic sources",
            ],
            Self::Performance => &[
                "Site speed monitoring",
                "Error tracking",
                "Performance optimization",
                "Resource loading",
            ],
            Self::Advertising => &[
                "Targeted advertising",
                "Campaign tracking",
                "Social media integration",
                "Marketing analytics",
            ],
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown cookie category: {s}"))
    }
}

/// Consent preferences, one flag per category.
///
/// `necessary` is not stored: it is granted in every instance, serializes as
/// `true`, and whatever a decoded record says about it is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "CategorySetRepr", into = "CategorySetRepr")]
pub struct CategorySet {
    pub functional: bool,
    pub analytics: bool,
    pub performance: bool,
    pub advertising: bool,
}

impl CategorySet {
    pub fn new(functional: bool, analytics: bool, performance: bool, advertising: bool) -> Self {
        Self {
            functional,
            analytics,
            performance,
            advertising,
        }
    }

    /// Every category granted.
    pub fn all_granted() -> Self {
        Self::new(true, true, true, true)
    }

    /// Only the required category. Same as `default()`.
    pub fn necessary_only() -> Self {
        Self::default()
    }

    pub fn necessary(&self) -> bool {
        true
    }

    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::Necessary => true,
            Category::Functional => self.functional,
            Category::Analytics => self.analytics,
            Category::Performance => self.performance,
            Category::Advertising => self.advertising,
        }
    }

    /// Set one category. Returns false, leaving the set unchanged, for
    /// `Necessary`.
    pub fn set(&mut self, category: Category, granted: bool) -> bool {
        let slot = match category {
            Category::Necessary => return false,
            Category::Functional => &mut self.functional,
            Category::Analytics => &mut self.analytics,
            Category::Performance => &mut self.performance,
            Category::Advertising => &mut self.advertising,
        };
        *slot = granted;
        true
    }

    /// Granted categories, `Necessary` first.
    pub fn granted(&self) -> impl Iterator<Item = Category> + '_ {
        Category::all().iter().copied().filter(|c| self.get(*c))
    }

    pub fn granted_count(&self) -> usize {
        self.granted().count()
    }
}

/// On-the-wire shape: all five flags, in record order.
#[derive(Serialize, Deserialize)]
struct CategorySetRepr {
    #[serde(default = "granted")]
    necessary: bool,
    #[serde(default)]
    functional: bool,
    #[serde(default)]
    analytics: bool,
    #[serde(default)]
    performance: bool,
    #[serde(default)]
    advertising: bool,
}

fn granted() -> bool {
    true
}

impl From<CategorySetRepr> for CategorySet {
    fn from(repr: CategorySetRepr) -> Self {
        Self::new(repr.functional, repr.analytics, repr.performance, repr.advertising)
    }
}

impl From<CategorySet> for CategorySetRepr {
    fn from(set: CategorySet) -> Self {
        Self {
            necessary: true,
            functional: set.functional,
            analytics: set.analytics,
            performance: set.performance,
            advertising: set.advertising,
        }
    }
}
