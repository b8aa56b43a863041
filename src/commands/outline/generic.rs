use super::positions::SourceLines;
use super::*;

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^([ \t]*)(?:(?:private|public|protected|global)[ \t]+)?(sub|function|method|event|delegate)[ \t]+([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)[ \t]*\(([^)]*)\)[ \t]*(?:as[ \t]+([A-Za-z_][A-Za-z0-9_<>]*))?",
    )
    .unwrap()
});
static END_DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*end\s+(sub|function|method|event|delegate)\b").unwrap()
});

fn declaration_kind(keyword: &str) -> SymbolKind {
    match keyword {
        "sub" | "method" => SymbolKind::Method,
        "event" => SymbolKind::Event,
        "delegate" => SymbolKind::Interface,
        _ => SymbolKind::Function,
    }
}

/// Flat list of routines for plain source files. Each routine runs to its
/// matching `End <keyword>`, or only over its declaration when there is none.
pub(super) fn build_generic_outline(source: &SourceLines<'_>) -> Vec<OutlineSymbol> {
    let text = source.text();
    let mut symbols = Vec::new();

    for captures in DECLARATION_RE.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let indent = captures.get(1).map(|m| m.len()).unwrap_or(0);
        let keyword = captures[2].to_lowercase();
        let name = captures[3].to_string();
        let params = captures.get(4).map(|m| m.as_str().trim()).unwrap_or("");

        let mut detail = format!("{} ({})", &captures[2], params);
        if let Some(return_type) = captures.get(5) {
            detail.push_str(" As ");
            detail.push_str(return_type.as_str());
        }

        let start = whole.start() + indent;
        let rest = &text[whole.end()..];
        let end = END_DECLARATION_RE
            .captures_iter(rest)
            .find(|end| end[1].eq_ignore_ascii_case(&keyword))
            .and_then(|end| end.get(0))
            .map(|end| whole.end() + end.end())
            .unwrap_or(whole.end());

        symbols.push(OutlineSymbol::leaf(
            name,
            detail,
            declaration_kind(&keyword),
            source.offset_range(start, end),
            source.offset_range(start, whole.end()),
        ));
    }

    symbols
}

#[cfg(test)]
mod generic_tests {
    use super::super::{extract_symbols, DeclaredKind, SymbolKind};

    #[test]
    fn generic_should_list_routines_with_signature_detail() {
        let text = "Sub Main()\n  Print(\"hi\")\nEnd Sub\n\nPrivate Function Add(a As Integer, b As Integer) As Integer\n  Return a + b\nEnd Function\n";
        let symbols = extract_symbols(text, DeclaredKind::GenericCode);

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name, "Main");
        assert_eq!(symbols[0].kind, SymbolKind::Method);
        assert_eq!(symbols[0].detail, "Sub ()");
        assert_eq!(symbols[0].full_range.start.line, 0);
        assert_eq!(symbols[0].full_range.end.line, 2);
        assert_eq!(symbols[0].full_range.end.character, 7);

        let add = &symbols[1];
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.detail, "Function (a As Integer, b As Integer) As Integer");
        assert_eq!(add.full_range.start.line, 4);
        assert_eq!(add.full_range.start.character, 0);
        assert_eq!(add.anchor_range.start, add.full_range.start);
        assert_eq!(add.anchor_range.end.line, 4);
        assert_eq!(add.full_range.end.line, 6);
    }

    #[test]
    fn generic_should_map_keywords_to_kinds() {
        let text = "  Event Changed(value As String)\n  End Event\nDelegate Callback(x As Integer)\nMethod App.Run()\nEnd Method\n";
        let symbols = extract_symbols(text, DeclaredKind::Unknown);

        let kinds: Vec<SymbolKind> = symbols.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SymbolKind::Event, SymbolKind::Interface, SymbolKind::Method]
        );
        assert_eq!(symbols[0].full_range.start.character, 2);
        assert_eq!(symbols[2].name, "App.Run");
    }

    #[test]
    fn generic_should_end_unterminated_routine_at_its_declaration() {
        let text = "Function Open() As Boolean\n  Return True\n";
        let symbols = extract_symbols(text, DeclaredKind::GenericCode);

        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].full_range, symbols[0].anchor_range);
        assert_eq!(symbols[0].full_range.end.line, 0);
        assert_eq!(symbols[0].full_range.end.character, 26);
    }

    #[test]
    fn generic_should_count_columns_in_utf16_units() {
        let text = "Sub Greet(name As String = \"Grüße\")\nEnd Sub\nSub 😀Bad()\n";
        let symbols = extract_symbols(text, DeclaredKind::GenericCode);

        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].anchor_range.end.line, 0);
        assert_eq!(symbols[0].anchor_range.end.character, 35);
    }

    #[test]
    fn generic_should_keep_anchor_on_declaration_line() {
        let text = "Sub Main()\n  As = 1\nEnd Sub\n";
        let symbols = extract_symbols(text, DeclaredKind::GenericCode);

        assert_eq!(symbols[0].anchor_range.end.line, 0);
        assert_eq!(symbols[0].anchor_range.end.character, 10);
        assert_eq!(symbols[0].detail, "Sub ()");
    }
}
