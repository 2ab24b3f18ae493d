//! Entry point for the WASM application

pub fn main() {
    plymeasure_frontend::mount();
}
