//! Hero section component

use leptos::*;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"PLY Measure"</h1>
            <p class="subtitle">
                "Upload a PLY point cloud and get its bounding-box dimensions. "
                "Choose an axis-aligned, oriented or principal-axes box."
            </p>
        </div>
    }
}
