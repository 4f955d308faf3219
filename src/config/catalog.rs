//! Fixed item catalog: which items each collection pass samples, and the
//! static exchange-link pairs the analyzer compares.
//!
//! Item names are the exact auction-house strings the upstream API matches
//! against, so they stay in Korean.

/// Market category code for enhancement materials
pub const CATEGORY_CODE_MATERIALS: u32 = 50000;

/// Market category code for engraving books
pub const CATEGORY_CODE_ENGRAVINGS: u32 = 40000;

/// Grade filter for the paged engraving sweep
pub const ENGRAVING_GRADE: &str = "유물";

/// Tier-4 enhancement materials
pub const MATERIALS_T4: &[&str] = &[
    "운명의 파편 주머니(대)",
    "아비도스 융화 재료",
    "운명의 돌파석",
    "운명의 수호석",
    "운명의 파괴석",
    "빙하의 숨결",
    "용암의 숨결",
];

/// Tier-3 enhancement materials
pub const MATERIALS_T3: &[&str] = &[
    "명예의 파편 주머니(대)",
    "최상급 오레하 융화 재료",
    "찬란한 명예의 돌파석",
    "정제된 수호강석",
    "정제된 파괴강석",
    "태양의 은총",
    "태양의 축복",
    "태양의 가호",
];

/// Untiered craft books
pub const MATERIALS_SPECIAL: &[&str] = &["장인의 재봉술", "장인의 야금술"];

/// Linked material pairs: `bundle_ratio` units of the low item convert into
/// one unit of the high item. All catalog pairs use the default ratio.
pub const EXCHANGE_PAIRS: &[(&str, &str)] = &[
    ("찬란한 명예의 돌파석", "운명의 돌파석"),
    ("운명의 돌파석", "위대한 운명의 돌파석"),
    ("정제된 파괴강석", "운명의 파괴석"),
    ("운명의 파괴석", "운명의 파괴석 결정"),
    ("정제된 수호강석", "운명의 수호석"),
    ("운명의 수호석", "운명의 수호석 결정"),
    ("최상급 오레하 융화 재료", "아비도스 융화 재료"),
    ("아비도스 융화 재료", "상급 아비도스 융화 재료"),
];
