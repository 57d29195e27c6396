// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A three-step tour over a headless document, rendered as text.
//!
//! This example shows how to:
//! - describe steps with placement preferences and a payload,
//! - react to navigation through `TourCallbacks`,
//! - drive smooth scrolling to an off-screen target and a target inside a scroll container,
//! - turn each frame into output with a `RenderStrategy`.
//!
//! Run:
//! - `cargo run -p understory_demos --example tour_basics`

use kurbo::{Point, Rect, Size};
use understory_placement::{Align, Side};
use understory_tour::headless::{ElementId, HeadlessHost};
use understory_tour::render::{Frame, RenderStrategy};
use understory_tour::{
    CloseRequest, Commands, ScrollBehavior, Step, Tour, TourCallbacks, TourConfig, TourSnapshot,
};

/// Prints navigation and close requests as they happen.
struct Log;

impl TourCallbacks<ElementId, &'static str> for Log {
    fn on_move(&mut self, s: &TourSnapshot<'_, ElementId, &'static str>, _: &mut Commands) {
        println!(
            "  on_move: step {} (from {}), scrolling: {}",
            s.current_index, s.previous_index, s.is_scrolling
        );
    }

    fn on_request_close(&mut self, request: &CloseRequest) {
        println!(
            "  close requested: inside mask = {}, overlay click = {}",
            request.inside_mask, request.overlay_click
        );
    }

    fn on_after_open(&mut self, _: &TourSnapshot<'_, ElementId, &'static str>, _: &mut Commands) {
        println!("  tour opened");
    }
}

/// Renders a frame as a single line of text.
struct TextRenderer {
    helper_size: Size,
}

impl RenderStrategy<ElementId, &'static str> for TextRenderer {
    type Output = String;

    fn render(&mut self, frame: &Frame<'_, ElementId, &'static str>) -> String {
        let text = frame.snapshot.step.map(|s| s.data).unwrap_or("");
        match frame.helper_rect(self.helper_size) {
            Some(helper) => {
                let placement = frame.helper.expect("helper rect implies placement");
                format!(
                    "[{}/{}] \"{text}\" mask={:?} helper={}-{} at ({}, {})",
                    frame.snapshot.current_index + 1,
                    frame.snapshot.steps.len(),
                    frame.mask,
                    placement.side,
                    placement.align,
                    helper.x0,
                    helper.y0,
                )
            }
            None => format!("[no helper] \"{text}\" mask={:?}", frame.mask),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut host = HeadlessHost::new(Size::new(1024.0, 768.0));
    host.insert(None, "#toolbar", Rect::new(0.0, 0.0, 1024.0, 48.0));
    host.insert(None, "#editor", Rect::new(40.0, 1400.0, 984.0, 1700.0));
    let sidebar = host.insert(None, "#sidebar", Rect::new(800.0, 60.0, 1020.0, 700.0));
    host.set_scroll_extent(sidebar, Size::new(220.0, 2400.0));
    host.insert(Some(sidebar), "#history", Rect::new(810.0, 1800.0, 1010.0, 1860.0));

    let steps = vec![
        Step {
            position: Side::Bottom.into(),
            align: Align::Center,
            ..Step::with_data("#toolbar", "Every command lives up here.")
        },
        Step {
            position: Side::Top.into(),
            ..Step::with_data("#editor", "Write your document here.")
        },
        Step {
            position: Side::Left.into(),
            align: Align::End,
            container: Some("#sidebar".into()),
            ..Step::with_data("#history", "Undo history, newest first.")
        },
    ];
    let config = TourConfig {
        scroll_behavior: ScrollBehavior::Smooth,
        ..TourConfig::default()
    };
    let mut tour = Tour::new(1, steps, config)
        .expect("default config is valid")
        .with_callbacks(Log);
    let mut renderer = TextRenderer {
        helper_size: Size::new(260.0, 90.0),
    };
    let helper = Some(renderer.helper_size);

    println!("mount");
    tour.mount(&mut host);
    println!("{}", tour.render(&host, helper, &mut renderer));

    for _ in 0..2 {
        println!("next");
        tour.next(&mut host);
        println!("  scrolling: {}", tour.is_scrolling());
        host.finish_scroll();
        host.pump(&mut tour);
        println!("{}", tour.render(&host, helper, &mut renderer));
    }

    println!("next (already at the end)");
    tour.next(&mut host);

    println!("click outside the mask");
    host.click(Point::new(10.0, 700.0));
    host.pump(&mut tour);

    tour.unmount(&mut host);
    println!("unmounted; {} listeners left", host.listener_count());
}
