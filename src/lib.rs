mod cli;
pub mod commands;
mod state;

pub use commands::{extract_symbols, DeclaredKind, OutlineSymbol, SymbolKind};
pub use state::{AppState, Document};

pub fn run() {
    match cli::run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error while running xojo-outline: {err:#}");
            std::process::exit(1);
        }
    }
}
