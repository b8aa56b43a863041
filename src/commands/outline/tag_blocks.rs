use super::controls::ControlHierarchy;
use super::groups::Category;
use super::positions::SourceLines;
use super::{OutlineSymbol, SymbolKind};

use regex::{Captures, Regex};
use std::sync::LazyLock;

static EVENTS_BEGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#tag\s+Events\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap());
static EVENTS_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#tag\s+EndEvents\b").unwrap());
static BLOCK_BEGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#tag\s+(Event|Method|MenuHandler|Property|Constant)\b").unwrap()
});
static BLOCK_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#tag\s+End(Event|Method|MenuHandler|Property|Constant)\b").unwrap()
});
static SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:Private|Public|Protected)\s+)?(sub|function)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)\s*(?:as\s+([A-Za-z_][A-Za-z0-9_<>]*))?",
    )
    .unwrap()
});
static HANDLES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bHandles\b").unwrap());
static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:Private|Public|Protected)\s+)?([A-Za-z_][A-Za-z0-9_]*)\s+As\s+([A-Za-z_][A-Za-z0-9_<>]*)",
    )
    .unwrap()
});
static LOOSE_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:Private|Public|Protected)\s+)?([A-Za-z_][A-Za-z0-9_]*)\s+As\s+([A-Za-z_][A-Za-z0-9_<>]*)\s*$",
    )
    .unwrap()
});
static CONSTANT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bName\s*=\s*([^,]+)").unwrap());
static CONSTANT_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bType\s*=\s*([^,]+)").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum BlockKind {
    Event,
    Method,
    Property,
    Constant,
}

impl BlockKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "event" => Some(BlockKind::Event),
            "method" | "menuhandler" => Some(BlockKind::Method),
            "property" => Some(BlockKind::Property),
            "constant" => Some(BlockKind::Constant),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenBlock {
    kind: BlockKind,
    start_line: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum EventsTarget {
    Control(usize),
    Named(String),
}

/// Where an extracted symbol should be attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Placement {
    Group(Category),
    Control(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct PlacedSymbol {
    pub placement: Placement,
    pub symbol: OutlineSymbol,
}

struct MethodDeclaration {
    name: String,
    detail: String,
    kind: SymbolKind,
    handles: bool,
}

fn method_declaration(line: &str) -> Option<MethodDeclaration> {
    let captures = SIGNATURE_RE.captures(line)?;
    let keyword = captures[1].to_ascii_lowercase();
    let kind = if keyword == "sub" {
        SymbolKind::Method
    } else {
        SymbolKind::Function
    };

    Some(MethodDeclaration {
        name: captures[2].to_string(),
        detail: signature_detail(&captures),
        kind,
        handles: HANDLES_RE.is_match(line),
    })
}

fn signature_detail(captures: &Captures<'_>) -> String {
    let params = captures.get(3).map(|m| m.as_str().trim()).unwrap_or("");
    match captures.get(4) {
        Some(return_type) => format!("({}) As {}", params, return_type.as_str()),
        None => format!("({})", params),
    }
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Tokenizes `#tag` blocks between `first_line` and `last_line`. With a
/// control hierarchy, events are routed to the control named by the
/// surrounding `#tag Events` block; without one, every event lands in the
/// event handler group.
pub(super) fn scan_tag_blocks(
    source: &SourceLines<'_>,
    first_line: usize,
    last_line: usize,
    controls: Option<&ControlHierarchy>,
) -> Vec<PlacedSymbol> {
    let mut scanner = TagBlockScanner {
        source,
        controls,
        target: None,
        open: None,
        symbols: Vec::new(),
    };

    if source.len() == 0 || first_line > last_line {
        return scanner.symbols;
    }

    let last_line = last_line.min(source.last_line());
    for index in first_line..=last_line {
        scanner.feed(index, source.line(index));
    }

    if let Some(open) = scanner.open.take() {
        scanner.close(open, last_line);
    }

    scanner.symbols
}

struct TagBlockScanner<'s, 'a> {
    source: &'s SourceLines<'a>,
    controls: Option<&'s ControlHierarchy>,
    target: Option<EventsTarget>,
    open: Option<OpenBlock>,
    symbols: Vec<PlacedSymbol>,
}

impl TagBlockScanner<'_, '_> {
    fn feed(&mut self, index: usize, line: &str) {
        if let Some(captures) = EVENTS_BEGIN_RE.captures(line) {
            let name = &captures[1];
            self.target = Some(
                match self.controls.and_then(|controls| controls.bind_events_target(name)) {
                    Some(control) => EventsTarget::Control(control),
                    None => EventsTarget::Named(name.to_string()),
                },
            );
            return;
        }

        if EVENTS_END_RE.is_match(line) {
            self.target = None;
            return;
        }

        if let Some(captures) = BLOCK_BEGIN_RE.captures(line) {
            if let Some(kind) = BlockKind::from_tag(&captures[1]) {
                self.open = Some(OpenBlock {
                    kind,
                    start_line: index,
                });
            }
            return;
        }

        if let Some(captures) = BLOCK_END_RE.captures(line) {
            let closes = BlockKind::from_tag(&captures[1]);
            if let Some(open) = self.open.filter(|open| Some(open.kind) == closes) {
                self.open = None;
                self.close(open, index);
            }
            return;
        }

        if self.open.is_none() {
            self.scan_loose_line(index, line);
        }
    }

    fn close(&mut self, block: OpenBlock, end_line: usize) {
        match block.kind {
            BlockKind::Event => self.close_event(block, end_line),
            BlockKind::Method => self.close_method(block, end_line),
            BlockKind::Property => self.close_property(block, end_line),
            BlockKind::Constant => self.close_constant(block, end_line),
        }
    }

    fn find_method(&self, block: OpenBlock, end_line: usize) -> Option<(usize, MethodDeclaration)> {
        (block.start_line..=end_line)
            .find_map(|index| method_declaration(self.source.line(index)).map(|decl| (index, decl)))
    }

    fn close_event(&mut self, block: OpenBlock, end_line: usize) {
        let Some((line, declaration)) = self.find_method(block, end_line) else {
            return;
        };

        let placement = match &self.target {
            Some(EventsTarget::Control(control)) => Placement::Control(*control),
            Some(EventsTarget::Named(name)) => {
                tracing::trace!("No control named {} for event {}", name, declaration.name);
                Placement::Group(Category::EventHandlers)
            }
            None => Placement::Group(Category::EventHandlers),
        };

        self.emit(
            placement,
            OutlineSymbol::leaf(
                declaration.name,
                declaration.detail,
                SymbolKind::Event,
                self.source.line_range(block.start_line, end_line),
                self.source.line_range(line, line),
            ),
        );
    }

    fn close_method(&mut self, block: OpenBlock, end_line: usize) {
        let Some((line, declaration)) = self.find_method(block, end_line) else {
            return;
        };

        let (category, kind) = if declaration.handles {
            (Category::MenuHandlers, SymbolKind::Event)
        } else {
            (Category::Methods, declaration.kind)
        };

        self.emit(
            Placement::Group(category),
            OutlineSymbol::leaf(
                declaration.name,
                declaration.detail,
                kind,
                self.source.line_range(block.start_line, end_line),
                self.source.line_range(line, line),
            ),
        );
    }

    fn close_property(&mut self, block: OpenBlock, end_line: usize) {
        let found = ((block.start_line + 1)..=end_line).find_map(|index| {
            PROPERTY_RE
                .captures(self.source.line(index))
                .map(|captures| (index, captures[1].to_string(), captures[2].to_string()))
        });
        let Some((line, name, type_name)) = found else {
            return;
        };

        let range = self.source.line_range(line, line);
        self.emit(
            Placement::Group(Category::Properties),
            OutlineSymbol::leaf(name, format!("As {}", type_name), SymbolKind::Property, range, range),
        );
    }

    fn close_constant(&mut self, block: OpenBlock, end_line: usize) {
        let header = self.source.line(block.start_line);
        let name = CONSTANT_NAME_RE
            .captures(header)
            .map(|captures| strip_quotes(&captures[1]).to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Constant".to_string());
        let detail = CONSTANT_TYPE_RE
            .captures(header)
            .map(|captures| strip_quotes(&captures[1]).to_string())
            .filter(|type_name| !type_name.is_empty())
            .map(|type_name| format!("As {}", type_name))
            .unwrap_or_else(|| "Constant".to_string());

        self.emit(
            Placement::Group(Category::Constants),
            OutlineSymbol::leaf(
                name,
                detail,
                SymbolKind::Constant,
                self.source.line_range(block.start_line, end_line),
                self.source.line_range(block.start_line, block.start_line),
            ),
        );
    }

    /// Declarations outside any tag block, as written in plain class files.
    fn scan_loose_line(&mut self, index: usize, line: &str) {
        if let Some(captures) = LOOSE_PROPERTY_RE.captures(line) {
            let range = self.source.line_range(index, index);
            let symbol = OutlineSymbol::leaf(
                &captures[1],
                format!("As {}", &captures[2]),
                SymbolKind::Property,
                range,
                range,
            );
            self.emit(Placement::Group(Category::Properties), symbol);
            return;
        }

        if let Some(declaration) = method_declaration(line) {
            let range = self.source.line_range(index, index);
            let (category, kind) = if declaration.handles {
                (Category::MenuHandlers, SymbolKind::Event)
            } else {
                (Category::Methods, declaration.kind)
            };
            self.emit(
                Placement::Group(category),
                OutlineSymbol::leaf(declaration.name, declaration.detail, kind, range, range),
            );
        }
    }

    fn emit(&mut self, placement: Placement, symbol: OutlineSymbol) {
        self.symbols.push(PlacedSymbol { placement, symbol });
    }
}
