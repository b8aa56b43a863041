use super::*;

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _bom_size)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    if bytes.len() > ENCODING_DETECT_SAMPLE_BYTES {
        detector.feed(&bytes[..ENCODING_DETECT_SAMPLE_BYTES], true);
    } else {
        detector.feed(bytes, true);
    }
    detector.guess(None, true)
}

fn decode_to_rope(bytes: &[u8], encoding: &'static Encoding) -> Rope {
    let (cow, _, _malformed) = encoding.decode(bytes);
    let normalized_content = text_utils::normalize_to_lf(&cow);
    Rope::from_str(&normalized_content)
}

fn file_info(id: String, doc: &Document) -> FileInfo {
    FileInfo {
        id,
        path: doc
            .path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
        name: doc
            .path
            .as_deref()
            .map(text_utils::display_name)
            .unwrap_or_else(|| UNTITLED_DOCUMENT_NAME.to_string()),
        encoding: doc.encoding.name().to_string(),
        line_count: doc.rope.len_lines(),
        declared_kind: doc.declared_kind,
    }
}

pub(super) fn open_file_impl(state: &AppState, path: String) -> Result<FileInfo, String> {
    let path_buf = PathBuf::from(&path);
    let file = File::open(&path_buf).map_err(|e| e.to_string())?;
    let size = file.metadata().map_err(|e| e.to_string())?.len();

    let (encoding, rope) = if size == 0 {
        (encoding_rs::UTF_8, Rope::new())
    } else {
        let mmap = unsafe { Mmap::map(&file).map_err(|e| e.to_string())? };
        let encoding = detect_encoding(&mmap);
        (encoding, decode_to_rope(&mmap, encoding))
    };

    let id = Uuid::new_v4().to_string();
    let doc = Document {
        rope,
        encoding,
        path: Some(path_buf),
        declared_kind: DeclaredKind::from_path(Path::new(&path)),
    };
    let info = file_info(id.clone(), &doc);

    tracing::debug!(
        "Opened {} as {} ({} lines, {:?})",
        path,
        info.encoding,
        info.line_count,
        info.declared_kind
    );

    state.documents.insert(id, doc);
    Ok(info)
}

pub(super) fn open_text_impl(state: &AppState, text: String, declared_kind: DeclaredKind) -> FileInfo {
    let id = Uuid::new_v4().to_string();
    let doc = Document {
        rope: Rope::from_str(&text_utils::normalize_to_lf(&text)),
        encoding: encoding_rs::UTF_8,
        path: None,
        declared_kind,
    };
    let info = file_info(id.clone(), &doc);

    state.documents.insert(id, doc);
    info
}

pub(super) fn get_file_info_impl(state: &AppState, id: String) -> Result<FileInfo, String> {
    match state.documents.get(&id) {
        Some(doc) => Ok(file_info(id, &doc)),
        None => Err("Document not found".to_string()),
    }
}

pub(super) fn close_file_impl(state: &AppState, id: String) {
    state.documents.remove(&id);
}

#[cfg(test)]
mod tests {
    use super::{close_file_impl, get_file_info_impl, open_file_impl, open_text_impl};
    use crate::commands::{get_outline, DeclaredKind};
    use crate::state::AppState;
    use std::fs;

    #[test]
    fn open_file_should_detect_kind_and_normalize_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("MainMenuBar.xojo_menu");
        fs::write(
            &path,
            "#tag Menu\r\nBegin Menu MainMenuBar\r\n   Begin DesktopMenuItem FileMenu\r\n      Text = \"&File\"\r\n   End\r\nEnd\r\n#tag EndMenu\r\n",
        )
        .unwrap();

        let state = AppState::new();
        let info = open_file_impl(&state, path.to_string_lossy().to_string()).unwrap();

        assert_eq!(info.name, "MainMenuBar.xojo_menu");
        assert_eq!(info.declared_kind, DeclaredKind::Menu);
        assert_eq!(info.encoding, "UTF-8");
        assert_eq!(info.line_count, 8);

        let doc = state.documents.get(&info.id).unwrap();
        assert!(!doc.rope.to_string().contains('\r'));
        drop(doc);

        let outline = get_outline(&state, info.id.clone(), None).unwrap();
        assert_eq!(outline[0].name, "MainMenuBar");
        assert_eq!(outline[0].children[0].detail, "&File");
    }

    #[test]
    fn open_file_should_decode_utf16_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Helpers.xojo_code");
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Module Helpers\nEnd Module\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(&path, bytes).unwrap();

        let state = AppState::new();
        let info = open_file_impl(&state, path.to_string_lossy().to_string()).unwrap();

        assert_eq!(info.encoding, "UTF-16LE");
        assert_eq!(info.declared_kind, DeclaredKind::CodeObject);
        let outline = get_outline(&state, info.id, None).unwrap();
        assert_eq!(outline[0].name, "Helpers");
    }

    #[test]
    fn open_file_should_accept_empty_files_and_report_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("Empty.xojo_code");
        fs::write(&empty, "").unwrap();

        let state = AppState::new();
        let info = open_file_impl(&state, empty.to_string_lossy().to_string()).unwrap();
        assert_eq!(info.line_count, 1);
        assert!(get_outline(&state, info.id, None).unwrap().is_empty());

        let missing = dir.path().join("Missing.xojo_code");
        assert!(open_file_impl(&state, missing.to_string_lossy().to_string()).is_err());
    }

    #[test]
    fn close_file_should_forget_document() {
        let state = AppState::new();
        let info = open_text_impl(&state, "Sub Main()\nEnd Sub\n".to_string(), DeclaredKind::GenericCode);
        assert_eq!(info.name, "Untitled");
        assert!(info.path.is_none());

        assert_eq!(get_outline(&state, info.id.clone(), None).unwrap().len(), 1);
        close_file_impl(&state, info.id.clone());
        assert_eq!(
            get_outline(&state, info.id, None).unwrap_err(),
            "Document not found"
        );
    }

    #[test]
    fn get_file_info_should_report_stored_path_and_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Legacy.xojo_window");
        fs::write(&path, b"Begin Window Legacy\r\n  Title = \"Caf\xe9\"\r\nEnd\r\n").unwrap();

        let state = AppState::new();
        let opened = open_file_impl(&state, path.to_string_lossy().to_string()).unwrap();
        let info = get_file_info_impl(&state, opened.id.clone()).unwrap();

        assert_eq!(info, opened);
        assert_eq!(info.path.as_deref(), Some(&*path.to_string_lossy()));
        assert_eq!(info.name, "Legacy.xojo_window");
        assert_ne!(info.encoding, "UTF-8");
        assert_eq!(info.declared_kind, DeclaredKind::Window);

        let untitled = open_text_impl(&state, "Sub Main()\nEnd Sub".to_string(), DeclaredKind::Unknown);
        let info = get_file_info_impl(&state, untitled.id.clone()).unwrap();
        assert_eq!(info.name, "Untitled");
        assert_eq!(info.path, None);
        assert_eq!(info.encoding, "UTF-8");

        close_file_impl(&state, untitled.id.clone());
        assert_eq!(get_file_info_impl(&state, untitled.id).unwrap_err(), "Document not found");
    }
}
