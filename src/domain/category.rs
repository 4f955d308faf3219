use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// One wide table exists per category. The collector currently fills
/// materials and engravings; the other tables are query-only legacy data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Materials,
    Lifeskill,
    BattleItems,
    Engravings,
    Gems,
}

impl Category {
    /// Stable filename fragment, e.g. "battleitems" for `market_battleitems.csv`
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Materials => "materials",
            Category::Lifeskill => "lifeskill",
            Category::BattleItems => "battleitems",
            Category::Engravings => "engravings",
            Category::Gems => "gems",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn slugs_are_unique() {
        let slugs: Vec<&str> = Category::iter().map(|c| c.slug()).collect();
        let mut deduped = slugs.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(slugs.len(), deduped.len(), "category slugs must not collide");
    }
}
