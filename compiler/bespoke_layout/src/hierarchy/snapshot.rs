//! Plain-data view of a sealed hierarchy, for tests and diagnostics.

use std::fmt;

use bespoke_base::LayoutIndex;

use super::LayoutHierarchy;

/// One layout, with relations as sorted index lists.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutSnapshot {
    pub index: LayoutIndex,
    pub description: String,
    pub concrete: bool,
    pub liveable: bool,
    pub parents: Vec<LayoutIndex>,
    pub children: Vec<LayoutIndex>,
    pub liveable_ancestor: LayoutIndex,
}

/// Every layout in index order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HierarchySnapshot {
    pub layouts: Vec<LayoutSnapshot>,
}

impl HierarchySnapshot {
    pub fn get(&self, index: LayoutIndex) -> Option<&LayoutSnapshot> {
        self.layouts.iter().find(|l| l.index == index)
    }
}

impl LayoutHierarchy {
    pub fn snapshot(&self) -> HierarchySnapshot {
        HierarchySnapshot {
            layouts: self
                .iter()
                .map(|l| LayoutSnapshot {
                    index: l.index(),
                    description: l.describe().to_owned(),
                    concrete: l.is_concrete(),
                    liveable: l.is_liveable(),
                    parents: l.parents().collect(),
                    children: l.children().collect(),
                    liveable_ancestor: l.liveable_ancestor(),
                })
                .collect(),
        }
    }
}

/// One line per layout: `layout#3 Dict* <- [layout#0]`, `*` marking
/// liveable layouts and `!` concrete ones.
impl fmt::Display for HierarchySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for l in &self.layouts {
            write!(f, "{} {}", l.index, l.description)?;
            if l.liveable {
                f.write_str("*")?;
            }
            if l.concrete {
                f.write_str("!")?;
            }
            if !l.parents.is_empty() {
                f.write_str(" <- [")?;
                for (i, p) in l.parents.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                f.write_str("]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
