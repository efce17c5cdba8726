use maud::{html, Markup};

/// Boxed section with a heading; `count` adds a small badge next to it.
pub fn card(heading: &str, count: Option<usize>, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 {
                (heading)
                @if let Some(n) = count {
                    " " span class="badge" { (n) }
                }
            }
            div class="card-body" {
                (body)
            }
        }
    }
}
