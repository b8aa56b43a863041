use super::controls::{is_window_type, ControlHierarchy};
use super::groups::{CategoryGroups, ALL_CATEGORIES};
use super::positions::SourceLines;
use super::tag_blocks::{scan_tag_blocks, Placement};
use super::*;

static WINDOW_ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*Begin\s+(DesktopWindow|Window)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

pub(super) fn build_window_outline(source: &SourceLines<'_>) -> Vec<OutlineSymbol> {
    let root = source
        .iter()
        .find_map(|(index, line)| {
            WINDOW_ROOT_RE
                .captures(line)
                .map(|captures| (index, captures[1].to_string(), captures[2].to_string()))
        });
    let (start_line, window_type, window_name) = match root {
        Some(found) => found,
        None => (0, "DesktopWindow".to_string(), "Window".to_string()),
    };

    let (hierarchy, blocks) = ControlHierarchy::build(source);
    let end_line = blocks
        .iter()
        .filter(|block| block.line >= start_line && is_window_type(&block.type_name))
        .filter_map(|block| block.end_line)
        .min()
        .unwrap_or(source.last_line())
        .max(start_line);

    let full_range = source.line_range(start_line, end_line);
    let anchor_range = source.line_range(start_line, start_line);

    let mut arena = SymbolArena::new();
    let window = arena.alloc(OutlineSymbol::leaf(
        window_name,
        window_type,
        SymbolKind::Class,
        full_range,
        anchor_range,
    ));
    let mut groups = CategoryGroups::new(window, ALL_CATEGORIES, full_range, anchor_range);

    let control_nodes: Vec<NodeId> = hierarchy
        .controls()
        .iter()
        .map(|control| {
            arena.alloc(OutlineSymbol::leaf(
                control.name.as_str(),
                control.type_name.as_str(),
                SymbolKind::Field,
                source.line_range(control.begin_line, control.end_line),
                source.line_range(control.begin_line, control.begin_line),
            ))
        })
        .collect();

    for (index, node) in control_nodes.iter().enumerate() {
        match hierarchy.parent_of(index) {
            Some(parent) => arena.push_child(control_nodes[parent], *node),
            None => {
                groups.push(&mut arena, Category::Controls, *node);
            }
        }
    }

    for placed in scan_tag_blocks(source, 0, source.last_line(), Some(&hierarchy)) {
        let node = arena.alloc(placed.symbol);
        match placed.placement {
            Placement::Control(control) => match control_nodes.get(control) {
                Some(owner) => arena.push_child(*owner, node),
                None => {
                    groups.push(&mut arena, Category::EventHandlers, node);
                }
            },
            Placement::Group(category) => {
                groups.push(&mut arena, category, node);
            }
        }
    }

    arena.into_symbols(&[window])
}

#[cfg(test)]
mod window_tests {
    use super::super::{extract_symbols, DeclaredKind, OutlineSymbol, SymbolKind};

    fn child<'a>(symbol: &'a OutlineSymbol, name: &str) -> &'a OutlineSymbol {
        symbol
            .children
            .iter()
            .find(|candidate| candidate.name == name)
            .unwrap_or_else(|| panic!("{} has no child {}", symbol.name, name))
    }

    const NESTED_WINDOW: &str = r#"#tag DesktopWindow
Begin DesktopWindow MainWindow
   Title = "Main"
   Begin DesktopCanvas A
   End
   Begin DesktopCanvas B
      InitialParent = "A"
   End
   Begin DesktopButton C
      InitialParent = "B"
   End
End
#tag EndDesktopWindow

#tag WindowCode
	#tag Event
		Sub Opening()
		End Sub
	#tag EndEvent

	#tag Property, Flags = &h21
		Private mReady As Boolean
	#tag EndProperty

	#tag Constant, Name = kTitle, Type = String, Dynamic = False, Default = \"Main\", Scope = Private
	#tag EndConstant
#tag EndWindowCode

#tag Events C
	#tag Event
		Sub Pressed()
		End Sub
	#tag EndEvent
#tag EndEvents
"#;

    #[test]
    fn window_should_nest_controls_along_initial_parent_chain() {
        let symbols = extract_symbols(NESTED_WINDOW, DeclaredKind::Window);

        assert_eq!(symbols.len(), 1);
        let window = &symbols[0];
        assert_eq!(window.name, "MainWindow");
        assert_eq!(window.detail, "DesktopWindow");
        assert_eq!(window.kind, SymbolKind::Class);
        assert_eq!(window.full_range.start.line, 1);
        assert_eq!(window.full_range.end.line, 11);

        let controls = child(window, "Controls");
        assert_eq!(controls.kind, SymbolKind::Namespace);
        assert_eq!(controls.children.len(), 1);
        let a = child(controls, "A");
        let b = child(a, "B");
        let c = child(b, "C");
        assert_eq!(c.kind, SymbolKind::Field);
        assert_eq!(c.detail, "DesktopButton");
        assert_eq!(c.children.len(), 1);
        assert_eq!(c.children[0].name, "Pressed");
        assert_eq!(c.children[0].kind, SymbolKind::Event);
    }

    #[test]
    fn window_should_group_code_in_first_use_order() {
        let symbols = extract_symbols(NESTED_WINDOW, DeclaredKind::Window);
        let names: Vec<&str> = symbols[0].children.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Controls", "Event Handlers", "Properties", "Constants"]);
        let constants = child(&symbols[0], "Constants");
        assert_eq!(constants.children[0].name, "kTitle");
        assert_eq!(constants.children[0].detail, "As String");
        let properties = child(&symbols[0], "Properties");
        assert_eq!(properties.children[0].name, "mReady");
        assert_eq!(properties.children[0].detail, "As Boolean");
    }

    #[test]
    fn window_should_lift_cyclic_controls_and_keep_their_children() {
        let text = r#"Begin Window Cyclic
   Begin Canvas X
      InitialParent = "Y"
   End
   Begin Canvas Y
      InitialParent = "X"
   End
   Begin Canvas Z
      InitialParent = "X"
   End
End
"#;
        let symbols = extract_symbols(text, DeclaredKind::Unknown);

        assert_eq!(symbols[0].detail, "Window");
        let controls = child(&symbols[0], "Controls");
        let names: Vec<&str> = controls.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["X", "Y"]);
        let x = child(controls, "X");
        assert_eq!(x.children.len(), 1);
        assert_eq!(x.children[0].name, "Z");
        assert!(child(controls, "Y").children.is_empty());
    }

    #[test]
    fn window_should_nest_long_initial_parent_chains() {
        let depth = 5_000;
        let mut text = String::from("Begin DesktopWindow Deep\n");
        for index in 0..depth {
            text.push_str(&format!("   Begin DesktopCanvas C{}\n", index));
            if index > 0 {
                text.push_str(&format!("      InitialParent = \"C{}\"\n", index - 1));
            }
            text.push_str("   End\n");
        }
        text.push_str("End\n");

        let symbols = extract_symbols(&text, DeclaredKind::Window);

        let controls = child(&symbols[0], "Controls");
        assert_eq!(controls.children.len(), 1);
        let mut current = &controls.children[0];
        let mut levels = 1;
        while let Some(next) = current.children.first() {
            current = next;
            levels += 1;
        }
        assert_eq!(levels, depth);
        assert_eq!(current.name, format!("C{}", depth - 1));
    }

    #[test]
    fn window_should_bind_duplicate_names_to_shallowest_control() {
        let text = r#"Begin DesktopWindow W
   Begin DesktopGroupBox Panel
   End
   Begin DesktopButton Btn
      InitialParent = "Panel"
   End
   Begin DesktopButton Btn
   End
End
#tag Events Btn
	#tag Event
		Sub Pressed()
		End Sub
	#tag EndEvent
#tag EndEvents
"#;
        let symbols = extract_symbols(text, DeclaredKind::Window);
        let controls = child(&symbols[0], "Controls");
        let names: Vec<&str> = controls.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Panel", "Btn"]);

        let nested = child(child(controls, "Panel"), "Btn");
        assert!(nested.children.is_empty());
        let top_level = &controls.children[1];
        assert_eq!(top_level.children.len(), 1);
        assert_eq!(top_level.children[0].name, "Pressed");
    }

    #[test]
    fn window_should_route_unknown_event_targets_and_menu_handlers() {
        let text = r#"Begin DesktopWindow W
End
#tag Events Missing
	#tag Event
		Sub Opening()
		End Sub
	#tag EndEvent
#tag EndEvents
#tag MenuHandler
	Function EditCopy() As Boolean Handles EditCopy.MenuItemSelected
	End Function
#tag EndMenuHandler
"#;
        let symbols = extract_symbols(text, DeclaredKind::Window);
        let window = &symbols[0];

        let handlers = child(window, "Event Handlers");
        assert_eq!(handlers.children[0].name, "Opening");
        let menu_handlers = child(window, "MenuHandlers");
        assert_eq!(menu_handlers.children[0].name, "EditCopy");
        assert_eq!(menu_handlers.children[0].kind, SymbolKind::Event);
        assert_eq!(menu_handlers.children[0].detail, "() As Boolean");
    }

    #[test]
    fn window_should_end_at_last_line_when_unterminated() {
        let text = "Begin DesktopWindow W\n   Begin DesktopButton B\n   End";
        let symbols = extract_symbols(text, DeclaredKind::Window);

        assert_eq!(symbols[0].full_range.end.line, 2);
        let controls = child(&symbols[0], "Controls");
        assert_eq!(controls.full_range, symbols[0].full_range);
        assert_eq!(controls.anchor_range, symbols[0].anchor_range);
    }
}
