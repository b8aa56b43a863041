use super::groups::CategoryGroups;
use super::positions::SourceLines;
use super::tag_blocks::{scan_tag_blocks, Placement};
use super::*;

const NAME_LOOKAHEAD_LINES: usize = 10;

static OBJECT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#tag\s+(Class|Module|Interface|Structure|Enum)\b").unwrap()
});
static OBJECT_END_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*#tag\s+End(Class|Module|Interface|Structure|Enum)\b").unwrap()
});
static OBJECT_DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:Private|Public|Protected)\s+)?(Class|Module|Interface|Structure|Enum)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ObjectType {
    Class,
    Module,
    Interface,
    Structure,
    Enum,
}

impl ObjectType {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "class" => Some(ObjectType::Class),
            "module" => Some(ObjectType::Module),
            "interface" => Some(ObjectType::Interface),
            "structure" => Some(ObjectType::Structure),
            "enum" => Some(ObjectType::Enum),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ObjectType::Class => "Class",
            ObjectType::Module => "Module",
            ObjectType::Interface => "Interface",
            ObjectType::Structure => "Structure",
            ObjectType::Enum => "Enum",
        }
    }

    fn symbol_kind(self) -> SymbolKind {
        match self {
            ObjectType::Class => SymbolKind::Class,
            ObjectType::Module => SymbolKind::Module,
            ObjectType::Interface => SymbolKind::Interface,
            ObjectType::Structure => SymbolKind::Struct,
            ObjectType::Enum => SymbolKind::Enum,
        }
    }

    fn permitted_categories(self) -> &'static [Category] {
        match self {
            ObjectType::Class => &[
                Category::Methods,
                Category::Properties,
                Category::EventHandlers,
                Category::Constants,
                Category::MenuHandlers,
            ],
            ObjectType::Module => &[Category::Methods, Category::Properties, Category::Constants],
            ObjectType::Interface => &[Category::Methods, Category::Properties],
            ObjectType::Structure => &[Category::Properties],
            ObjectType::Enum => &[],
        }
    }
}

struct ObjectHeader {
    object_type: ObjectType,
    name: Option<String>,
    line: usize,
    tagged: bool,
}

fn find_object_header(source: &SourceLines<'_>) -> Option<ObjectHeader> {
    source.iter().find_map(|(index, line)| {
        if let Some(captures) = OBJECT_TAG_RE.captures(line) {
            let object_type = ObjectType::from_keyword(&captures[1])?;
            return Some(ObjectHeader {
                object_type,
                name: None,
                line: index,
                tagged: true,
            });
        }

        let captures = OBJECT_DECLARATION_RE.captures(line)?;
        Some(ObjectHeader {
            object_type: ObjectType::from_keyword(&captures[1])?,
            name: Some(captures[2].to_string()),
            line: index,
            tagged: false,
        })
    })
}

/// Name of a tagged object, read from the first matching declaration shortly
/// after its `#tag` line.
fn lookahead_name(source: &SourceLines<'_>, header: &ObjectHeader) -> Option<String> {
    let last = (header.line + NAME_LOOKAHEAD_LINES).min(source.len());
    (header.line..last).find_map(|index| {
        let captures = OBJECT_DECLARATION_RE.captures(source.line(index))?;
        (ObjectType::from_keyword(&captures[1]) == Some(header.object_type))
            .then(|| captures[2].to_string())
    })
}

fn find_object_end(source: &SourceLines<'_>, header: &ObjectHeader) -> usize {
    (header.line..source.len())
        .rev()
        .find(|index| {
            OBJECT_END_TAG_RE
                .captures(source.line(*index))
                .and_then(|captures| ObjectType::from_keyword(&captures[1]))
                == Some(header.object_type)
        })
        .unwrap_or(source.last_line())
}

pub(super) fn build_code_object_outline(source: &SourceLines<'_>) -> Vec<OutlineSymbol> {
    let Some(header) = find_object_header(source) else {
        return Vec::new();
    };

    let name = match &header.name {
        Some(name) => Some(name.clone()),
        None if header.tagged => lookahead_name(source, &header),
        None => None,
    }
    .unwrap_or_else(|| "Object".to_string());
    let end_line = find_object_end(source, &header).max(header.line);
    let full_range = source.line_range(header.line, end_line);
    let anchor_range = source.line_range(header.line, header.line);

    let mut arena = SymbolArena::new();
    let object = arena.alloc(OutlineSymbol::leaf(
        name,
        header.object_type.label(),
        header.object_type.symbol_kind(),
        full_range,
        anchor_range,
    ));
    let mut groups = CategoryGroups::new(
        object,
        header.object_type.permitted_categories(),
        full_range,
        anchor_range,
    );

    for placed in scan_tag_blocks(source, 0, source.last_line(), None) {
        let category = match placed.placement {
            Placement::Group(category) => category,
            Placement::Control(_) => Category::EventHandlers,
        };
        if !groups.permits(category) {
            tracing::trace!(
                "Dropping {} from {}: no {} group",
                placed.symbol.name,
                header.object_type.label(),
                category.label()
            );
            continue;
        }
        let node = arena.alloc(placed.symbol);
        groups.push(&mut arena, category, node);
    }

    arena.into_symbols(&[object])
}

#[cfg(test)]
mod code_object_tests {
    use super::super::{extract_symbols, DeclaredKind, OutlineSymbol, SymbolKind};

    fn group<'a>(symbol: &'a OutlineSymbol, name: &str) -> Option<&'a OutlineSymbol> {
        symbol.children.iter().find(|child| child.name == name)
    }

    const CLASS_SOURCE: &str = r#"#tag Class
Protected Class Invoice
	#tag Event
		Sub Constructor()
		End Sub
	#tag EndEvent

	#tag Method, Flags = &h0
		Function Total() As Currency
		  Return mTotal
		End Function
	#tag EndMethod

	#tag MenuHandler
		Function FilePrint() As Boolean Handles FilePrint.MenuItemSelected
		End Function
	#tag EndMenuHandler

	#tag Property, Flags = &h21
		Private mTotal As Currency
	#tag EndProperty

	#tag Constant, Name = kVersion, Type = Double, Dynamic = False, Default = \"1\", Scope = Public
	#tag EndConstant

End Class
#tag EndClass
"#;

    #[test]
    fn class_should_collect_members_into_permitted_groups() {
        let symbols = extract_symbols(CLASS_SOURCE, DeclaredKind::CodeObject);

        assert_eq!(symbols.len(), 1);
        let class = &symbols[0];
        assert_eq!(class.name, "Invoice");
        assert_eq!(class.detail, "Class");
        assert_eq!(class.kind, SymbolKind::Class);
        assert_eq!(class.full_range.start.line, 0);
        assert_eq!(class.full_range.end.line, 26);

        let names: Vec<&str> = class.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Event Handlers", "Methods", "MenuHandlers", "Properties", "Constants"]
        );

        let total = &group(class, "Methods").unwrap().children[0];
        assert_eq!(total.name, "Total");
        assert_eq!(total.kind, SymbolKind::Function);
        assert_eq!(total.detail, "() As Currency");

        let print = &group(class, "MenuHandlers").unwrap().children[0];
        assert_eq!(print.kind, SymbolKind::Event);
    }

    #[test]
    fn enum_should_not_emit_any_groups() {
        let text = "#tag Enum, Name = Colors, Type = Integer, Flags = &h0\nPublic Enum Colors\n  Red\n  Green\n  Sub Bogus()\n#tag EndEnum\n";
        let symbols = extract_symbols(text, DeclaredKind::CodeObject);

        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "Colors");
        assert_eq!(symbols[0].kind, SymbolKind::Enum);
        assert!(symbols[0].children.is_empty());
    }

    #[test]
    fn structure_should_keep_only_properties() {
        let text = "#tag Structure\nPrivate Structure Point\n  X As Double\n  Y As Double\n  Sub Bogus()\n#tag EndStructure\n";
        let symbols = extract_symbols(text, DeclaredKind::CodeObject);
        let point = &symbols[0];

        assert_eq!(point.kind, SymbolKind::Struct);
        let names: Vec<&str> = point.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Properties"]);
        let properties: Vec<&str> = point.children[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(properties, vec!["X", "Y"]);
    }

    #[test]
    fn module_should_read_free_form_declarations() {
        let text = "Module Helpers\n  Public Counter As Integer\n  Public Function Twice(value As Integer) As Integer\n    Return value * 2\n  End Function\nEnd Module\n";
        let symbols = extract_symbols(text, DeclaredKind::CodeObject);
        let helpers = &symbols[0];

        assert_eq!(helpers.name, "Helpers");
        assert_eq!(helpers.kind, SymbolKind::Module);
        assert_eq!(helpers.full_range.end.line, 6);
        assert_eq!(group(helpers, "Properties").unwrap().children[0].name, "Counter");
        let twice = &group(helpers, "Methods").unwrap().children[0];
        assert_eq!(twice.name, "Twice");
        assert_eq!(twice.detail, "(value As Integer) As Integer");
    }

    #[test]
    fn tagged_object_without_declaration_should_be_named_object() {
        let text = "#tag Interface\n#tag Method\nSub Run()\n#tag EndMethod\n#tag EndInterface";
        let symbols = extract_symbols(text, DeclaredKind::CodeObject);

        assert_eq!(symbols[0].name, "Object");
        assert_eq!(symbols[0].kind, SymbolKind::Interface);
        assert_eq!(symbols[0].full_range.end.line, 4);
        assert_eq!(group(&symbols[0], "Methods").unwrap().children[0].name, "Run");
    }
}
