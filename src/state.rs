use crate::commands::DeclaredKind;
use dashmap::DashMap;
use encoding_rs::Encoding;
use ropey::Rope;
use std::path::PathBuf;

pub struct Document {
    pub rope: Rope,
    pub encoding: &'static Encoding,
    pub path: Option<PathBuf>,
    pub declared_kind: DeclaredKind,
}

#[derive(Default)]
pub struct AppState {
    pub documents: DashMap<String, Document>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }
}
