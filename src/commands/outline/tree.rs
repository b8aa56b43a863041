use super::OutlineSymbol;

pub(super) type NodeId = usize;

struct SymbolNode {
    symbol: OutlineSymbol,
    children: Vec<NodeId>,
}

/// Symbols are built by index so that controls, groups and handlers can all be
/// attached to a node after it was created. The arena is turned into an owned
/// tree once assembly is done.
#[derive(Default)]
pub(super) struct SymbolArena {
    nodes: Vec<Option<SymbolNode>>,
}

impl SymbolArena {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn alloc(&mut self, symbol: OutlineSymbol) -> NodeId {
        self.nodes.push(Some(SymbolNode {
            symbol,
            children: Vec::new(),
        }));
        self.nodes.len() - 1
    }

    pub(super) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }

        if let Some(Some(node)) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Each node is moved out at most once, so a node reachable twice is only
    /// emitted under its first parent.
    pub(super) fn into_symbols(mut self, roots: &[NodeId]) -> Vec<OutlineSymbol> {
        roots
            .iter()
            .filter_map(|root| self.take(*root))
            .collect()
    }

    fn take(&mut self, id: NodeId) -> Option<OutlineSymbol> {
        let node = self.nodes.get_mut(id)?.take()?;
        let mut stack = vec![(node.symbol, node.children.into_iter())];

        while let Some((_, pending)) = stack.last_mut() {
            match pending.next() {
                Some(child) => {
                    if let Some(node) = self.nodes.get_mut(child).and_then(Option::take) {
                        stack.push((node.symbol, node.children.into_iter()));
                    }
                }
                None => {
                    let (symbol, _) = stack.pop()?;
                    match stack.last_mut() {
                        Some((parent, _)) => parent.children.push(symbol),
                        None => return Some(symbol),
                    }
                }
            }
        }

        None
    }
}
