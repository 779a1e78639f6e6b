//! Department color categories.
//!
//! The token for a department depends only on its id, so charts keep their
//! colors across reloads and filters. Two departments may share a token.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::org_chart::model::{walk, NodeId, OrgChartNode};

/// Visual category of a department. The rendering layer maps tokens to styles.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryToken {
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
    Teal,
    Indigo,
    Amber,
    /// Reserved for the unassigned group, never produced by the hash.
    Slate,
}

/// Tokens selectable by [`department_color`], in palette order.
pub const PALETTE: [CategoryToken; 8] = [
    CategoryToken::Blue,
    CategoryToken::Green,
    CategoryToken::Purple,
    CategoryToken::Orange,
    CategoryToken::Pink,
    CategoryToken::Teal,
    CategoryToken::Indigo,
    CategoryToken::Amber,
];

pub const UNASSIGNED_COLOR: CategoryToken = CategoryToken::Slate;

/// Rolling hash over UTF-16 code units: `hash = unit + ((hash << 5) - hash)`.
///
/// The shift operates on the 32-bit truncation of the accumulator while the
/// subtraction keeps full width, matching the browser client's arithmetic.
fn rolling_hash(value: &str) -> i64 {
    value.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32).wrapping_shl(5));
        i64::from(unit) + (shifted - hash)
    })
}

pub fn department_color(department_id: &str) -> CategoryToken {
    let index = rolling_hash(department_id).unsigned_abs() % PALETTE.len() as u64;
    PALETTE[index as usize]
}

/// Color of every department node in `nodes`, keyed by node id
/// (`department:<id>`, or `unassigned` for the group without a department).
/// Keying by node id keeps a department whose raw id is `unassigned` apart
/// from the unassigned group.
pub fn department_colors(nodes: &[OrgChartNode]) -> BTreeMap<NodeId, CategoryToken> {
    let mut colors = BTreeMap::new();
    walk(nodes, &mut |node, _, _| {
        if let OrgChartNode::Department(dept) = node {
            let color = match &dept.department_id {
                Some(id) => department_color(id),
                None => UNASSIGNED_COLOR,
            };
            colors.insert(node.id().clone(), color);
        }
    });
    colors
}
