//! Catalog products. `units_sold` only grows.

use super::{EntityRule, FieldRule, MergeStrategy};
use crate::primitives::FieldResolver::*;

pub static PRODUCT: MergeStrategy = MergeStrategy {
    name: "product",
    fields: &[
        ("sku", FieldRule::high(LastWriteWins)),
        ("name", FieldRule::normal(LastWriteWins)),
        ("price", FieldRule::normal(LastWriteWins)),
        ("units_sold", FieldRule::normal(Max)),
        ("categories", FieldRule::normal(Union)),
        ("active", FieldRule::normal(LogicalOr)),
        ("description", FieldRule::cosmetic()),
        ("image_url", FieldRule::cosmetic()),
    ],
    rule: EntityRule::None,
};
