use super::controls::{scan_begin_blocks, BeginBlock};
use super::positions::SourceLines;
use super::*;

static MENU_ROOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*Begin\s+Menu\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static MENU_END_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#tag\s+EndMenu\b").unwrap());
static ANY_BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*Begin\s+").unwrap());
static MENU_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*Begin\s+(Menu|Desktop(?:[A-Za-z]+)?MenuItem|DesktopMenuBar)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});
static MENU_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*Text\s*=\s*"([^"]*)""#).unwrap());

const SEPARATOR_TEXT: &str = "-";

fn menu_item_kind(type_name: &str) -> SymbolKind {
    match type_name.to_ascii_lowercase().as_str() {
        "menu" | "desktopmenubar" => SymbolKind::Namespace,
        "desktopquitmenuitem" => SymbolKind::Event,
        _ => SymbolKind::Field,
    }
}

fn find_menu_end(source: &SourceLines<'_>, start_line: usize) -> usize {
    let mut depth = 0i64;
    for index in start_line..source.len() {
        let line = source.line(index);
        if MENU_END_TAG_RE.is_match(line) {
            return index;
        }
        if ANY_BEGIN_RE.is_match(line) {
            depth += 1;
        } else if BARE_END_RE.is_match(line) {
            depth -= 1;
            if depth == 0 {
                return index;
            }
        }
    }
    source.last_line()
}

pub(super) fn build_menu_outline(source: &SourceLines<'_>) -> Vec<OutlineSymbol> {
    let root = source.iter().find_map(|(index, line)| {
        MENU_ROOT_RE
            .captures(line)
            .map(|captures| (index, captures[1].to_string()))
    });
    let (start_line, menu_name) = root.unwrap_or((0, "Menu".to_string()));
    let end_line = find_menu_end(source, start_line).max(start_line);

    let mut arena = SymbolArena::new();
    let menu = arena.alloc(OutlineSymbol::leaf(
        menu_name,
        "Menu",
        SymbolKind::Namespace,
        source.line_range(start_line, end_line),
        source.line_range(start_line, start_line),
    ));

    let blocks = scan_begin_blocks(source, &MENU_ITEM_RE, &MENU_TEXT_RE);
    let mut block_at_line: Vec<Option<usize>> = vec![None; source.len()];
    for (index, block) in blocks.iter().enumerate() {
        block_at_line[block.line] = Some(index);
    }

    if end_line > start_line + 1 {
        let mut builder = MenuBuilder {
            source,
            blocks: &blocks,
            block_at_line: &block_at_line,
            arena: &mut arena,
        };
        builder.collect_items(menu, start_line + 1, end_line - 1);
    }

    arena.into_symbols(&[menu])
}

struct MenuBuilder<'s, 'a> {
    source: &'s SourceLines<'a>,
    blocks: &'s [BeginBlock],
    block_at_line: &'s [Option<usize>],
    arena: &'s mut SymbolArena,
}

impl MenuBuilder<'_, '_> {
    fn collect_items(&mut self, parent: NodeId, first_line: usize, last_line: usize) {
        let blocks = self.blocks;
        let mut index = first_line;
        while index <= last_line {
            let Some(block) = self.block_at_line.get(index).copied().flatten() else {
                index += 1;
                continue;
            };
            let block = &blocks[block];

            if block.type_name.eq_ignore_ascii_case("Menu") {
                index += 1;
                continue;
            }

            let item_end = block
                .end_line
                .unwrap_or(self.source.last_line())
                .max(index);
            let item = self.arena.alloc(menu_item_symbol(self.source, block, index, item_end));
            self.arena.push_child(parent, item);

            if item_end > index + 1 {
                self.collect_items(item, index + 1, item_end - 1);
            }
            index = item_end + 1;
        }
    }
}

fn menu_item_symbol(
    source: &SourceLines<'_>,
    block: &BeginBlock,
    start_line: usize,
    end_line: usize,
) -> OutlineSymbol {
    let text = block
        .attributes
        .iter()
        .find(|value| !value.is_empty())
        .map(String::as_str);

    let (kind, detail) = match text {
        Some(SEPARATOR_TEXT) => (SymbolKind::Null, "Separator".to_string()),
        Some(text) => (menu_item_kind(&block.type_name), text.to_string()),
        None => (menu_item_kind(&block.type_name), block.type_name.clone()),
    };

    OutlineSymbol::leaf(
        block.name.as_str(),
        detail,
        kind,
        source.line_range(start_line, end_line),
        source.line_range(start_line, start_line),
    )
}
