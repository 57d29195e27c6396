// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Waiting for a step's element to appear.
//!
//! With `wait_for_element`, navigating to a step whose element does not exist yet keeps
//! reporting the previous index. A mutation watch notices when the element is inserted,
//! the element cache is rebuilt, and the tour catches up.
//!
//! Run:
//! - `cargo run -p understory_demos --example tour_wait_for_element`

use kurbo::{Rect, Size};
use understory_tour::headless::{ElementId, HeadlessHost};
use understory_tour::{Commands, MutationWatch, Step, Tour, TourCallbacks, TourConfig, TourSnapshot};

struct Announce;

impl TourCallbacks<ElementId, ()> for Announce {
    fn on_move(&mut self, s: &TourSnapshot<'_, ElementId, ()>, _: &mut Commands) {
        let selector = s.step.map_or("-", |step| step.selector.as_str());
        println!(
            "  visible step {} ({selector}), target resolved: {}",
            s.current_index,
            s.target.is_some()
        );
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut host = HeadlessHost::new(Size::new(800.0, 600.0));
    let app = host.insert(None, "#app", Rect::new(0.0, 0.0, 800.0, 600.0));
    host.insert(Some(app), "#open-dialog", Rect::new(20.0, 20.0, 160.0, 60.0));
    let panel = host.insert(Some(app), "#panel", Rect::new(200.0, 100.0, 700.0, 500.0));

    let steps = vec![
        Step::new("#open-dialog"),
        Step::new("#dialog"),
        Step::new("#confirm"),
    ];
    let config = TourConfig {
        wait_for_element: true,
        mutation_watches: vec![MutationWatch::new("#app").subtree()],
        ..TourConfig::default()
    };
    let mut tour = Tour::new(1, steps, config)
        .expect("default lengths are valid")
        .with_callbacks(Announce);
    tour.mount(&mut host);

    println!("goto(1) before the dialog exists");
    tour.goto(&mut host, 1);
    println!(
        "  requested {}, visible {}",
        tour.requested_index(),
        tour.current_index()
    );

    println!("the dialog opens");
    let dialog = host.insert(Some(panel), "#dialog", Rect::new(250.0, 150.0, 650.0, 450.0));
    host.pump(&mut tour);
    println!("  focus rect {:?}", tour.focus_rect());

    println!("the confirm button renders inside the dialog");
    host.insert(Some(dialog), "#confirm", Rect::new(520.0, 400.0, 630.0, 440.0));
    host.pump(&mut tour);
    tour.next(&mut host);
    println!("  focus rect {:?}", tour.focus_rect());

    tour.unmount(&mut host);
}
