// templates/pages/snapshot.rs

use crate::templates::{card, desktop_layout};
use chrono::NaiveDate;
use maud::{html, Markup};

pub struct SnapshotRow {
    pub code: String,
    pub activity: String,
    pub time: String,
    pub mention: String,
}

pub struct SnapshotVm {
    pub date: NaiveDate,
    /// False when nothing has been stored for this date yet.
    pub observed: bool,
    pub rows: Vec<SnapshotRow>,
    pub recent_dates: Vec<NaiveDate>,
}

pub fn snapshot_page(vm: &SnapshotVm) -> Markup {
    let date = vm.date.format("%Y-%m-%d").to_string();

    desktop_layout(
        &format!("Bookings {date}"),
        html! {
            main class="container" {
                h1 { "Bookings for " (date) }

                @if !vm.observed {
                    p class="muted" { "No snapshot stored for this date yet." }
                } @else if vm.rows.is_empty() {
                    p { "😱 No games planned." }
                } @else {
                    table {
                        thead {
                            tr { th { "Game" } th { "Time" } th { "Game master" } }
                        }
                        tbody {
                            @for row in &vm.rows {
                                tr {
                                    td title=(row.activity) { (row.code) }
                                    td { (row.time) }
                                    td { (row.mention) }
                                }
                            }
                        }
                    }
                }

                @if !vm.recent_dates.is_empty() {
                    (card("Stored dates", Some(vm.recent_dates.len()), html! {
                        ul {
                            @for d in &vm.recent_dates {
                                @let d = d.format("%Y-%m-%d").to_string();
                                li { a href={ "/snapshots/" (d) } { (d) } }
                            }
                        }
                    }))
                }
            }
        },
    )
}
