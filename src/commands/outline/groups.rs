use super::tree::{NodeId, SymbolArena};
use super::{OutlineSymbol, SymbolKind, TextRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Category {
    Controls,
    EventHandlers,
    Methods,
    MenuHandlers,
    Properties,
    Constants,
}

impl Category {
    pub(super) fn label(self) -> &'static str {
        match self {
            Category::Controls => "Controls",
            Category::EventHandlers => "Event Handlers",
            Category::Methods => "Methods",
            Category::MenuHandlers => "MenuHandlers",
            Category::Properties => "Properties",
            Category::Constants => "Constants",
        }
    }
}

pub(super) const ALL_CATEGORIES: &[Category] = &[
    Category::Controls,
    Category::EventHandlers,
    Category::Methods,
    Category::MenuHandlers,
    Category::Properties,
    Category::Constants,
];

/// Category groups under one owner, created on first use.
pub(super) struct CategoryGroups {
    owner: NodeId,
    permitted: &'static [Category],
    created: Vec<(Category, NodeId)>,
    full_range: TextRange,
    anchor_range: TextRange,
}

impl CategoryGroups {
    pub(super) fn new(
        owner: NodeId,
        permitted: &'static [Category],
        full_range: TextRange,
        anchor_range: TextRange,
    ) -> Self {
        Self {
            owner,
            permitted,
            created: Vec::new(),
            full_range,
            anchor_range,
        }
    }

    pub(super) fn permits(&self, category: Category) -> bool {
        self.permitted.contains(&category)
    }

    /// Returns `None` when the owner does not allow `category`.
    pub(super) fn ensure(&mut self, arena: &mut SymbolArena, category: Category) -> Option<NodeId> {
        if !self.permits(category) {
            return None;
        }

        if let Some((_, id)) = self.created.iter().find(|(existing, _)| *existing == category) {
            return Some(*id);
        }

        let id = arena.alloc(OutlineSymbol::leaf(
            category.label(),
            "",
            SymbolKind::Namespace,
            self.full_range,
            self.anchor_range,
        ));
        arena.push_child(self.owner, id);
        self.created.push((category, id));
        Some(id)
    }

    pub(super) fn push(&mut self, arena: &mut SymbolArena, category: Category, child: NodeId) -> bool {
        match self.ensure(arena, category) {
            Some(group) => {
                arena.push_child(group, child);
                true
            }
            None => false,
        }
    }
}
