use super::positions::SourceLines;
use super::BARE_END_RE;

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static CONTROL_BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Begin\s+|BeginDesktop[A-Za-z]+\s+)([A-Za-z_][A-Za-z0-9_]*)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap()
});
static INITIAL_PARENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*InitialParent\s*=\s*"([^"]*)""#).unwrap());

/// A `Begin <Type> <Name>` ... `End` block, with the values of one attribute
/// collected from its direct body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct BeginBlock {
    pub line: usize,
    pub type_name: String,
    pub name: String,
    pub end_line: Option<usize>,
    pub attributes: Vec<String>,
}

/// Single pass over the document pairing every Begin line with the bare `End`
/// that closes it. Attribute lines are credited to the innermost open block.
pub(super) fn scan_begin_blocks(
    source: &SourceLines<'_>,
    begin_re: &Regex,
    attribute_re: &Regex,
) -> Vec<BeginBlock> {
    let mut blocks: Vec<BeginBlock> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for (index, line) in source.iter() {
        if let Some(captures) = begin_re.captures(line) {
            blocks.push(BeginBlock {
                line: index,
                type_name: captures[1].to_string(),
                name: captures[2].to_string(),
                end_line: None,
                attributes: Vec::new(),
            });
            open.push(blocks.len() - 1);
            continue;
        }

        if BARE_END_RE.is_match(line) {
            if let Some(block) = open.pop() {
                blocks[block].end_line = Some(index);
            }
            continue;
        }

        if let Some(&block) = open.last() {
            if let Some(captures) = attribute_re.captures(line) {
                blocks[block].attributes.push(captures[1].to_string());
            }
        }
    }

    blocks
}

pub(super) fn is_window_type(type_name: &str) -> bool {
    type_name.eq_ignore_ascii_case("Window") || type_name.eq_ignore_ascii_case("DesktopWindow")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct ControlRecord {
    pub name: String,
    pub type_name: String,
    pub parent_name: Option<String>,
    pub begin_line: usize,
    pub end_line: usize,
}

/// Controls of one window with the resolved container of each. Depth counts
/// the control itself, so a top-level control has depth 1.
pub(super) struct ControlHierarchy {
    controls: Vec<ControlRecord>,
    parents: Vec<Option<usize>>,
    depths: Vec<usize>,
}

impl ControlHierarchy {
    pub(super) fn build(source: &SourceLines<'_>) -> (Self, Vec<BeginBlock>) {
        let blocks = scan_begin_blocks(source, &CONTROL_BEGIN_RE, &INITIAL_PARENT_RE);
        let last_line = source.last_line();

        let controls = blocks
            .iter()
            .filter(|block| !is_window_type(&block.type_name))
            .map(|block| ControlRecord {
                name: block.name.clone(),
                type_name: block.type_name.clone(),
                parent_name: block
                    .attributes
                    .iter()
                    .rev()
                    .map(|value| value.trim())
                    .find(|value| !value.is_empty())
                    .map(str::to_string),
                begin_line: block.line,
                end_line: block.end_line.unwrap_or(last_line).max(block.line),
            })
            .collect();

        (Self::from_controls(controls), blocks)
    }

    pub(super) fn from_controls(controls: Vec<ControlRecord>) -> Self {
        let mut first_by_name: HashMap<&str, usize> = HashMap::new();
        for (index, control) in controls.iter().enumerate() {
            first_by_name.entry(control.name.as_str()).or_insert(index);
        }

        let declared: Vec<Option<usize>> = controls
            .iter()
            .map(|control| {
                control
                    .parent_name
                    .as_deref()
                    .and_then(|name| first_by_name.get(name).copied())
            })
            .collect();

        let (parents, depths) = resolve_parents(&declared);
        Self {
            controls,
            parents,
            depths,
        }
    }

    pub(super) fn controls(&self) -> &[ControlRecord] {
        &self.controls
    }

    pub(super) fn depth(&self, index: usize) -> usize {
        self.depths.get(index).copied().unwrap_or(0)
    }

    /// Control to nest `index` under, `None` for top-level controls.
    pub(super) fn parent_of(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    /// Picks the control that an `#tag Events <name>` block belongs to. Names
    /// match exactly; among duplicates the shallowest path wins, then the
    /// first declared.
    pub(super) fn bind_events_target(&self, name: &str) -> Option<usize> {
        self.controls
            .iter()
            .enumerate()
            .filter(|(_, control)| control.name == name)
            .map(|(index, _)| (self.depth(index), index))
            .min()
            .map(|(_, index)| index)
    }

    #[cfg(test)]
    fn path_names(&self, index: usize) -> Vec<&str> {
        let mut names = vec![self.controls[index].name.as_str()];
        let mut current = index;
        while let Some(parent) = self.parent_of(current) {
            names.push(self.controls[parent].name.as_str());
            current = parent;
        }
        names.reverse();
        names
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Pending,
    InProgress,
    Done,
}

/// Resolves every control's container once. Controls that sit on a parent
/// cycle become top-level; a control whose chain only runs into a cycle keeps
/// its parent.
fn resolve_parents(declared: &[Option<usize>]) -> (Vec<Option<usize>>, Vec<usize>) {
    let mut state = vec![Resolution::Pending; declared.len()];
    let mut parents: Vec<Option<usize>> = vec![None; declared.len()];
    let mut depths = vec![1; declared.len()];
    let mut chain: Vec<usize> = Vec::new();

    for start in 0..declared.len() {
        let mut current = Some(start);
        while let Some(index) = current {
            match state[index] {
                Resolution::Done => break,
                Resolution::InProgress => {
                    let cycle_start = chain.iter().position(|node| *node == index).unwrap_or(0);
                    for node in chain.drain(cycle_start..) {
                        state[node] = Resolution::Done;
                    }
                    break;
                }
                Resolution::Pending => {
                    state[index] = Resolution::InProgress;
                    chain.push(index);
                    current = declared[index];
                }
            }
        }

        while let Some(index) = chain.pop() {
            if let Some(parent) = declared[index] {
                parents[index] = Some(parent);
                depths[index] = depths[parent] + 1;
            }
            state[index] = Resolution::Done;
        }
    }

    (parents, depths)
}
