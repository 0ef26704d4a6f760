//! Perch demo - a scripted popup session on a headless host.
//!
//! Opens an anchored menu on a phone-sized viewport, rotates the device,
//! dismisses the menu with an outside tap, then opens a dimmed dialog and
//! completes it. Run with `RUST_LOG=perch=debug,perch_demo=info` to see
//! every lifecycle step.
//!
//! An optional first argument names a JSON file with `OverlayConfig`
//! overrides.

use std::time::{Duration, Instant};

use anyhow::Context;
use perch::{
    Alignment, ElementId, EventResult, HeadlessHost, Insets, MouseButton, MouseEvent, Offset, OverlayConfig,
    OverlayHandle, OverlayRequest, OverlayStack, Panel, PanelContext, Point, Rect, Size, ViewportMetrics,
};
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);

/// Drives frames on a virtual clock.
struct Session {
    host: HeadlessHost,
    stack: OverlayStack<String>,
    clock: Instant,
}

impl Session {
    /// Render frames until nothing is animating or settling.
    fn settle(&mut self, label: &str) {
        loop {
            self.clock += FRAME;
            let frame = self.stack.frame(&mut self.host, self.clock);
            for layer in &frame.layers {
                tracing::debug!(
                    id = layer.id.raw(),
                    state = ?layer.state,
                    rect = ?layer.panel_rect,
                    opacity = layer.transition.opacity,
                    "{label}"
                );
            }
            if !frame.needs_frame {
                if let Some(layer) = frame.layers.last() {
                    tracing::info!(node = %layer.node, rect = ?layer.panel_rect, anchor = ?layer.anchor, "{label}: settled");
                } else {
                    tracing::info!("{label}: no overlays");
                }
                return;
            }
        }
    }
}

fn load_config() -> anyhow::Result<OverlayConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(OverlayConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    Ok(config)
}

fn menu(cx: &PanelContext<'_, &'static str>) -> Panel<String> {
    let width = cx.max_size().width.min(180.0);
    Panel::new(format!("menu {width}px"), Size::new(width, 132.0))
}

fn dialog(cx: &PanelContext<'_, &'static str>) -> Panel<String> {
    let max = cx.max_size();
    Panel::new("save dialog".to_string(), Size::new(max.width.min(320.0), 200.0))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config()?;
    tracing::info!(?config, "Starting perch demo");

    let portrait = ViewportMetrics::new(Size::new(390.0, 844.0))
        .with_safe_area(Insets::new(47.0, 0.0, 34.0, 0.0))
        .with_scale_factor(3.0);
    let mut session = Session {
        host: HeadlessHost::new(portrait),
        stack: OverlayStack::with_config(config)?,
        clock: Instant::now(),
    };

    // Toolbar button pinned 16px from the right edge, under the status bar.
    let button = ElementId::named("toolbar.more");
    let place_button = |host: &mut HeadlessHost, width: f32, top: f32| {
        host.place(button, Rect::new(width - 56.0, top, 40.0, 40.0));
    };
    place_button(&mut session.host, 390.0, 47.0);

    let menu_handle: OverlayHandle<&'static str> = session.stack.show(
        &mut session.host,
        button,
        OverlayRequest::new(menu as fn(&PanelContext<'_, &'static str>) -> Panel<String>)
            .anchor(button)
            .alignment(Alignment::BOTTOM_RIGHT)
            .offset(Offset::new(0.0, 4.0))
            .safe_area(true),
        session.clock,
    )?;
    session.settle("menu opened");

    // Rotate: the safe area moves to the sides and the button follows the
    // right edge.
    let landscape = ViewportMetrics::new(Size::new(844.0, 390.0))
        .with_safe_area(Insets::new(0.0, 47.0, 21.0, 47.0))
        .with_scale_factor(3.0);
    let change = session.host.set_viewport(landscape);
    tracing::info!(?change, "device rotated");
    session.host.begin_frame();
    place_button(&mut session.host, 844.0 - 47.0, 8.0);
    session.settle("menu after rotation");

    let outside = MouseEvent::ButtonPressed {
        button: MouseButton::Left,
        position: Point::new(60.0, 300.0),
    };
    let routed = session.stack.on_mouse(&outside, session.clock);
    tracing::info!(?routed, "tapped outside the menu");
    session.settle("menu dismissed");
    let choice = menu_handle.await;
    tracing::info!(?choice, "menu result");

    let dialog_handle = session.stack.show(
        &mut session.host,
        button,
        OverlayRequest::new(dialog as fn(&PanelContext<'_, &'static str>) -> Panel<String>)
            .dim_background(true)
            .dismissible(false)
            .safe_area(true),
        session.clock,
    )?;
    session.settle("dialog opened");

    let blocked = session.stack.on_mouse(&outside, session.clock);
    if blocked != EventResult::Captured {
        anyhow::bail!("dialog barrier let a tap through: {blocked:?}");
    }

    let completer = dialog_handle.completer();
    completer.complete("save");
    session.settle("dialog completed");
    let answer = dialog_handle.await;
    tracing::info!(?answer, "dialog result");

    // Completing again is a no-op.
    if completer.complete("discard") {
        anyhow::bail!("completer still live after disposal");
    }

    tracing::info!(
        subscribers = session.host.hub().subscriber_count(),
        unsubscribed = session.host.hub().unsubscribe_count(),
        "demo finished"
    );
    Ok(())
}
