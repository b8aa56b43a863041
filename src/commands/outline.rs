use super::*;

use regex::Regex;
use std::sync::LazyLock;

mod code_object;
mod controls;
mod generic;
mod groups;
mod menu;
mod positions;
mod tag_blocks;
mod tree;
mod window;

use groups::Category;
use positions::SourceLines;
use tree::{NodeId, SymbolArena};

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPosition {
    pub line: usize,
    pub character: usize,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    pub fn contains(&self, other: &TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Class,
    Module,
    Interface,
    Struct,
    Enum,
    Method,
    Function,
    Event,
    Property,
    Constant,
    Namespace,
    Field,
    Null,
}

/// One node of the outline tree. `anchor_range` marks the declaration line and
/// always lies inside `full_range`.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutlineSymbol {
    pub name: String,
    pub detail: String,
    pub kind: SymbolKind,
    pub full_range: TextRange,
    pub anchor_range: TextRange,
    pub children: Vec<OutlineSymbol>,
}

impl OutlineSymbol {
    pub(super) fn leaf(
        name: impl Into<String>,
        detail: impl Into<String>,
        kind: SymbolKind,
        full_range: TextRange,
        anchor_range: TextRange,
    ) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
            kind,
            full_range,
            anchor_range,
            children: Vec::new(),
        }
    }
}

/// Document kind as reported by the host, usually derived from the file extension.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DeclaredKind {
    GenericCode,
    Menu,
    Window,
    CodeObject,
    #[default]
    Unknown,
}

impl DeclaredKind {
    pub fn from_path(path: &Path) -> Self {
        let Some(extension) = path.extension().and_then(|value| value.to_str()) else {
            return DeclaredKind::Unknown;
        };

        match extension.to_ascii_lowercase().as_str() {
            "xojo_menu" => DeclaredKind::Menu,
            "xojo_window" => DeclaredKind::Window,
            "xojo_code" => DeclaredKind::CodeObject,
            "xojo_script" | "rbbas" => DeclaredKind::GenericCode,
            other if other.starts_with("xojo_") => DeclaredKind::GenericCode,
            _ => DeclaredKind::Unknown,
        }
    }
}

pub fn parse_declared_kind(label: &str) -> Option<DeclaredKind> {
    match label.trim().to_lowercase().as_str() {
        "menu" | "xojo_menu" => Some(DeclaredKind::Menu),
        "window" | "xojo_window" => Some(DeclaredKind::Window),
        "code" | "xojo_code" | "code-object" | "code_object" => Some(DeclaredKind::CodeObject),
        "xojo" | "generic" | "generic-code" => Some(DeclaredKind::GenericCode),
        "unknown" | "" => Some(DeclaredKind::Unknown),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Menu,
    Window,
    CodeObject,
    Generic,
}

static MENU_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^#tag\s+Menu\b").unwrap());
static MENU_BEGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^Begin\s+Menu\s+").unwrap());
static WINDOW_BEGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^Begin\s+(?:DesktopWindow|Window)\b").unwrap());
static WINDOW_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^#tag\s+Window\b").unwrap());
static OBJECT_TAG_SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*#tag\s+(?:Class|Module|Interface|Structure|Enum)\b").unwrap()
});
static OBJECT_DECLARATION_SIGNATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[ \t]*(?:(?:Private|Public|Protected)[ \t]+)?(?:Class|Module|Interface|Structure|Enum)[ \t]+[A-Za-z_][A-Za-z0-9_]*",
    )
    .unwrap()
});
pub(super) static BARE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*End\s*$").unwrap());

pub fn classify_dialect(text: &str, declared_kind: DeclaredKind) -> Dialect {
    if declared_kind == DeclaredKind::Menu
        || MENU_TAG_RE.is_match(text)
        || MENU_BEGIN_RE.is_match(text)
    {
        return Dialect::Menu;
    }

    if declared_kind == DeclaredKind::Window
        || WINDOW_TAG_RE.is_match(text)
        || WINDOW_BEGIN_RE.is_match(text)
    {
        return Dialect::Window;
    }

    if declared_kind == DeclaredKind::CodeObject
        && (OBJECT_TAG_SIGNATURE_RE.is_match(text) || OBJECT_DECLARATION_SIGNATURE_RE.is_match(text))
    {
        return Dialect::CodeObject;
    }

    Dialect::Generic
}

/// Builds the outline of one document. Malformed input never fails; it only
/// yields fewer symbols.
pub fn extract_symbols(text: &str, declared_kind: DeclaredKind) -> Vec<OutlineSymbol> {
    let normalized = text_utils::normalize_to_lf(text);
    let dialect = classify_dialect(&normalized, declared_kind);
    let source = SourceLines::new(&normalized);

    let symbols = match dialect {
        Dialect::Menu => menu::build_menu_outline(&source),
        Dialect::Window => window::build_window_outline(&source),
        Dialect::CodeObject => code_object::build_code_object_outline(&source),
        Dialect::Generic => generic::build_generic_outline(&source),
    };

    tracing::debug!(
        "Extracted {} root symbols ({:?} dialect, {} lines)",
        symbols.len(),
        dialect,
        source.len()
    );

    symbols
}

fn filter_outline_symbol_by_keyword(symbol: &OutlineSymbol, keyword: &str) -> Option<OutlineSymbol> {
    let is_matched = symbol.name.to_lowercase().contains(keyword);

    let filtered_children = symbol
        .children
        .iter()
        .filter_map(|child| filter_outline_symbol_by_keyword(child, keyword))
        .collect::<Vec<OutlineSymbol>>();

    if !is_matched && filtered_children.is_empty() {
        return None;
    }

    Some(OutlineSymbol {
        children: filtered_children,
        ..symbol.clone()
    })
}

pub fn filter_outline_symbols_impl(symbols: Vec<OutlineSymbol>, keyword: String) -> Vec<OutlineSymbol> {
    let normalized_keyword = keyword.trim().to_lowercase();
    if normalized_keyword.is_empty() {
        return symbols;
    }

    symbols
        .iter()
        .filter_map(|symbol| filter_outline_symbol_by_keyword(symbol, normalized_keyword.as_str()))
        .collect()
}

pub(super) fn get_outline_impl(
    state: &AppState,
    id: String,
    declared_kind: Option<DeclaredKind>,
) -> Result<Vec<OutlineSymbol>, String> {
    if let Some(doc) = state.documents.get(&id) {
        let source = doc.rope.to_string();
        let kind = declared_kind.unwrap_or(doc.declared_kind);
        Ok(extract_symbols(&source, kind))
    } else {
        Err("Document not found".to_string())
    }
}
