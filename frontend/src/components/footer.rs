//! Footer component

use leptos::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>"Plymeasure • Powered by " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
            <div class="footer-links">
                <a href="https://appwrite.io/docs" class="footer-link" target="_blank">
                    "Appwrite"
                </a>
                <a href="https://en.wikipedia.org/wiki/PLY_(file_format)" class="footer-link" target="_blank">
                    "PLY format"
                </a>
            </div>
        </footer>
    }
}
