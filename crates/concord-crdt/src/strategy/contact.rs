use super::{EntityRule, FieldRule, MergeStrategy};
use crate::primitives::FieldResolver::*;

pub static CONTACT: MergeStrategy = MergeStrategy {
    name: "contact",
    fields: &[
        ("name", FieldRule::normal(LastWriteWins)),
        ("email", FieldRule::normal(LastWriteWins)),
        ("phone", FieldRule::normal(LastWriteWins)),
        ("tax_id", FieldRule::high(LastWriteWins)),
        ("active", FieldRule::normal(LogicalOr)),
        ("tags", FieldRule::normal(Union)),
        ("notes", FieldRule::cosmetic()),
        ("display_color", FieldRule::cosmetic()),
    ],
    rule: EntityRule::None,
};
