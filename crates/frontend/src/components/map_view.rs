use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use fleet_shared::geo::{format_lat_lon, GeoBounds, MapProjection};
use fleet_shared::models::{DeviceKey, DeviceStatus};

use crate::coords;

const MAP_CONTAINER_ID: &str = "fleet-map-container";

/// Drag threshold in pixels; movement below this is treated as a click.
const DRAG_THRESHOLD: f64 = 3.0;

/// Touch drag threshold, larger than the mouse one.
const TOUCH_DRAG_THRESHOLD: f64 = 8.0;

const ZOOM_MIN: f64 = 1.0;
const ZOOM_MAX: f64 = 32.0;
const ZOOM_STEP: f64 = 1.15;

/// Screen distance within which a click selects a marker.
const HIT_RADIUS_PX: f64 = 14.0;

/// Space kept free around the fitted positions.
const FIT_PADDING_PX: f64 = 32.0;

/// Container size assumed until the first resize observation.
const DEFAULT_SIZE: (f64, f64) = (960.0, 600.0);

/// Shown when there is nothing to fit.
const WORLD_BOUNDS: GeoBounds = GeoBounds {
    south: -60.0,
    west: -180.0,
    north: 75.0,
    east: 180.0,
};

/// Labels are drawn from this zoom level on, and always for the selection.
const LABEL_MIN_ZOOM: f64 = 2.0;

/// Upper bound on graticule lines per axis.
const MAX_GRATICULE_LINES: usize = 400;

/// One thing to draw on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    /// `None` for positions that do not resolve to a listed device. Those are
    /// drawn but cannot be selected.
    pub device: Option<DeviceKey>,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub course: Option<f64>,
    pub status: DeviceStatus,
    pub is_unknown: bool,
    pub valid: bool,
}

fn status_color(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Online => "#3fb27f",
        DeviceStatus::Offline => "#d9534f",
        DeviceStatus::Unknown => "#9aa4b1",
    }
}

const UNLINKED_COLOR: &str = "#c9a227";
const HIGHLIGHT_COLOR: &str = "#f0ad4e";

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

/// Get the bounding client rect of the map container element.
fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

// ---------------------------------------------------------------------------
// Zoom / pan math
// ---------------------------------------------------------------------------

/// Compute new pan offsets so that `cursor` stays over the same content point
/// when zooming from `old_zoom` to `new_zoom`.
fn zoom_pan_at_cursor(
    cursor_x: f64,
    cursor_y: f64,
    old_zoom: f64,
    new_zoom: f64,
    old_pan_x: f64,
    old_pan_y: f64,
) -> (f64, f64) {
    let content_x = (cursor_x - old_pan_x) / old_zoom;
    let content_y = (cursor_y - old_pan_y) / old_zoom;
    (
        cursor_x - content_x * new_zoom,
        cursor_y - content_y * new_zoom,
    )
}

/// Clamp pan values so the layer can't be dragged off-screen. The layer is
/// the size of the container, scaled by `zoom`.
fn clamp_pan(pan_x: f64, pan_y: f64, zoom: f64, container_w: f64, container_h: f64) -> (f64, f64) {
    let min_pan_x = -(container_w * zoom - container_w).max(0.0);
    let min_pan_y = -(container_h * zoom - container_h).max(0.0);
    (pan_x.clamp(min_pan_x, 0.0), pan_y.clamp(min_pan_y, 0.0))
}

fn clamp_pan_to_container(pan_x: f64, pan_y: f64, zoom: f64) -> (f64, f64) {
    match container_rect() {
        Some(rect) => clamp_pan(pan_x, pan_y, zoom, rect.width(), rect.height()),
        None => (pan_x, pan_y),
    }
}

/// Convert a wheel delta (pixels / lines / pages) to a uniform pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

fn point_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

/// Find the index of the nearest point within `threshold`.
fn find_nearest(points: &[(f64, f64)], click: (f64, f64), threshold: f64) -> Option<usize> {
    let mut best_idx = None;
    let mut best_dist = threshold;
    for (i, p) in points.iter().enumerate() {
        let d = point_distance(*p, click);
        if d < best_dist {
            best_dist = d;
            best_idx = Some(i);
        }
    }
    best_idx
}

/// Device under a click in layer pixels. Unlinked markers are skipped.
fn hit_test(
    markers: &[MapMarker],
    projection: &MapProjection,
    click: (f64, f64),
    threshold: f64,
) -> Option<DeviceKey> {
    let selectable: Vec<(DeviceKey, (f64, f64))> = markers
        .iter()
        .filter_map(|m| {
            m.device
                .map(|key| (key, projection.project(m.latitude, m.longitude)))
        })
        .collect();
    let points: Vec<(f64, f64)> = selectable.iter().map(|(_, p)| *p).collect();
    find_nearest(&points, click, threshold).map(|i| selectable[i].0)
}

// ---------------------------------------------------------------------------
// SVG builder
// ---------------------------------------------------------------------------

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the overlay SVG body. Coordinates are layer pixels; `s` keeps
/// strokes and markers a constant on-screen size under zoom.
fn build_svg_content(
    markers: &[MapMarker],
    projection: &MapProjection,
    zoom: f64,
    selected: Option<DeviceKey>,
    highlighted: &[DeviceKey],
) -> String {
    let mut svg = String::with_capacity(4096 + markers.len() * 256);
    let s = 1.0 / zoom.max(ZOOM_MIN);

    build_graticule(&mut svg, projection, zoom, s);

    // Unlinked first so device markers sit on top.
    for m in markers.iter().filter(|m| m.device.is_none()) {
        build_unlinked_marker(&mut svg, m, projection, s);
    }
    for m in markers.iter().filter(|m| m.device.is_some()) {
        let is_selected = m.device.is_some() && m.device == selected;
        let is_highlighted = m.device.is_some_and(|k| highlighted.contains(&k));
        build_device_marker(
            &mut svg,
            m,
            projection,
            s,
            is_selected,
            is_highlighted,
            zoom >= LABEL_MIN_ZOOM || is_selected,
        );
    }
    svg
}

fn format_degrees(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else if step >= 0.1 {
        1
    } else if step >= 0.01 {
        2
    } else {
        3
    };
    format!("{:.*}°", decimals, value)
}

fn build_graticule(svg: &mut String, projection: &MapProjection, zoom: f64, s: f64) {
    let step = projection.graticule_step(zoom);
    let (north, west) = projection.unproject(0.0, 0.0);
    let (south, east) = projection.unproject(projection.width_px, projection.height_px);
    let w = projection.width_px;
    let h = projection.height_px;
    let sw = 1.0 * s;
    let fs = 10.0 * s;

    let first_lon = (west / step).ceil() as i64;
    let last_lon = (east / step).floor() as i64;
    for i in (first_lon..=last_lon).take(MAX_GRATICULE_LINES) {
        let lon = i as f64 * step;
        let (x, _) = projection.project(0.0, lon);
        svg.push_str(&format!(
            r#"<line x1="{x}" y1="0" x2="{x}" y2="{h}" stroke="rgba(255,255,255,0.08)" stroke-width="{sw}"/>"#
        ));
        let label = format_degrees(lon, step);
        let ty = 12.0 * s;
        svg.push_str(&format!(
            r#"<text x="{x}" y="{ty}" fill="rgba(255,255,255,0.35)" font-size="{fs}" font-family="monospace" text-anchor="middle">{label}</text>"#
        ));
    }

    let first_lat = (south / step).ceil() as i64;
    let last_lat = (north / step).floor() as i64;
    for i in (first_lat..=last_lat).take(MAX_GRATICULE_LINES) {
        let lat = i as f64 * step;
        let (_, y) = projection.project(lat, 0.0);
        svg.push_str(&format!(
            r#"<line x1="0" y1="{y}" x2="{w}" y2="{y}" stroke="rgba(255,255,255,0.08)" stroke-width="{sw}"/>"#
        ));
        let label = format_degrees(lat, step);
        let tx = 4.0 * s;
        svg.push_str(&format!(
            r#"<text x="{tx}" y="{y}" fill="rgba(255,255,255,0.35)" font-size="{fs}" font-family="monospace" text-anchor="start" dominant-baseline="central">{label}</text>"#
        ));
    }
}

fn build_unlinked_marker(svg: &mut String, m: &MapMarker, projection: &MapProjection, s: f64) {
    let (x, y) = projection.project(m.latitude, m.longitude);
    let r = 5.0 * s;
    let sw = 2.0 * s;
    let da = 2.0 * s;
    svg.push_str(&format!(
        r##"<g role="img" class="marker-unlinked"><title>Unlinked position</title><circle cx="{x}" cy="{y}" r="{r}" fill="none" stroke="{UNLINKED_COLOR}" stroke-width="{sw}" stroke-dasharray="{da} {da}"/></g>"##
    ));
}

fn build_device_marker(
    svg: &mut String,
    m: &MapMarker,
    projection: &MapProjection,
    s: f64,
    selected: bool,
    highlighted: bool,
    show_label: bool,
) {
    let (x, y) = projection.project(m.latitude, m.longitude);
    let color = status_color(m.status);
    let sw = 2.0 * s;
    let opacity = if m.valid { 1.0 } else { 0.55 };
    let dash = if m.valid {
        String::new()
    } else {
        format!(r#" stroke-dasharray="{} {}""#, 3.0 * s, 2.0 * s)
    };
    let label = escape_xml(&m.label);

    svg.push_str(&format!(
        r##"<g role="img" opacity="{opacity}"><title>{label}</title>"##
    ));

    if highlighted {
        let r = 13.0 * s;
        svg.push_str(&format!(
            r##"<circle cx="{x}" cy="{y}" r="{r}" fill="rgba(240,173,78,0.2)" stroke="{HIGHLIGHT_COLOR}" stroke-width="{sw}"/>"##
        ));
    }

    if let (Some(course), true) = (m.course, m.valid) {
        let len = 14.0 * s;
        let rad = course.to_radians();
        let x2 = x + len * rad.sin();
        let y2 = y - len * rad.cos();
        svg.push_str(&format!(
            r##"<line x1="{x}" y1="{y}" x2="{x2}" y2="{y2}" stroke="{color}" stroke-width="{sw}" stroke-linecap="round"/>"##
        ));
    }

    if m.is_unknown {
        let d = 7.0 * s;
        svg.push_str(&format!(
            r##"<path d="M {x} {} L {} {y} L {x} {} L {} {y} Z" fill="{color}" stroke="white" stroke-width="{sw}"{dash}/>"##,
            y - d,
            x + d,
            y + d,
            x - d
        ));
    } else {
        let r = 6.0 * s;
        svg.push_str(&format!(
            r##"<circle cx="{x}" cy="{y}" r="{r}" fill="{color}" stroke="white" stroke-width="{sw}"{dash}/>"##
        ));
    }

    if show_label {
        let fs = 12.0 * s;
        let ly = y - 12.0 * s;
        let tsw = 3.0 * s;
        svg.push_str(&format!(
            r##"<text x="{x}" y="{ly}" fill="white" font-size="{fs}" font-family="sans-serif" font-weight="600" text-anchor="middle" stroke="rgba(0,0,0,0.7)" stroke-width="{tsw}" paint-order="stroke">{label}</text>"##
        ));
    }

    if selected {
        build_selection_ring(svg, x, y, s);
    }
    svg.push_str("</g>");
}

/// Emit an animated dashed selection ring around a marker.
fn build_selection_ring(svg: &mut String, cx: f64, cy: f64, s: f64) {
    let r = 16.0 * s;
    let sw = 2.5 * s;
    let da1 = 5.0 * s;
    let da2 = 3.0 * s;
    svg.push_str(&format!(
        r##"<circle cx="{cx}" cy="{cy}" r="{r}" fill="none" stroke="white" stroke-width="{sw}" stroke-dasharray="{da1} {da2}" opacity="0.9"><animate attributeName="opacity" values="0.5;1;0.5" dur="1.2s" repeatCount="indefinite"/></circle>"##
    ));
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(
    markers: ReadSignal<Vec<MapMarker>>,
    fit: ReadSignal<Option<GeoBounds>>,
    selected: ReadSignal<Option<DeviceKey>>,
    highlighted: ReadSignal<Vec<DeviceKey>>,
    on_select: EventHandler<Option<DeviceKey>>,
    on_bounds: EventHandler<GeoBounds>,
) -> Element {
    let mut zoom = use_signal(|| 1.0_f64);
    let mut pan_x = use_signal(|| 0.0_f64);
    let mut pan_y = use_signal(|| 0.0_f64);
    let mut size = use_signal(|| DEFAULT_SIZE);

    // The frame is fixed once positions first arrive so refreshes don't move
    // the map under the operator. Double-click re-fits.
    let mut frame = use_signal(|| None::<GeoBounds>);
    use_effect(move || {
        let latest = *fit.read();
        if frame.peek().is_none() && latest.is_some() {
            frame.set(latest);
        }
    });

    let projection = use_memo(move || {
        let (w, h) = *size.read();
        let bounds = frame.read().unwrap_or(WORLD_BOUNDS);
        MapProjection::fit(&bounds, w, h, FIT_PADDING_PX)
    });

    use_effect(move || {
        let proj = *projection.read();
        let bounds = proj.visible_bounds(*zoom.read(), *pan_x.read(), *pan_y.read());
        on_bounds.call(bounds);
    });

    let mut reset_view = move || {
        frame.set(*fit.peek());
        zoom.set(1.0);
        pan_x.set(0.0);
        pan_y.set(0.0);
    };

    let mut zoom_at = move |cx: f64, cy: f64, factor: f64| {
        let old_z = *zoom.peek();
        let new_z = (old_z * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        if (new_z - old_z).abs() < 1e-9 {
            return;
        }
        let (w, h) = *size.peek();
        let (new_px, new_py) =
            zoom_pan_at_cursor(cx, cy, old_z, new_z, *pan_x.peek(), *pan_y.peek());
        let (px, py) = clamp_pan(new_px, new_py, new_z, w, h);
        zoom.set(new_z);
        pan_x.set(px);
        pan_y.set(py);
    };

    let select_at = move |client_x: f64, client_y: f64| {
        let z = *zoom.peek();
        if let Some(click) = coords::click_to_layer_px(
            client_x,
            client_y,
            MAP_CONTAINER_ID,
            z,
            *pan_x.peek(),
            *pan_y.peek(),
        ) {
            let hit = hit_test(&markers.peek(), &projection.peek(), click, HIT_RADIUS_PX / z);
            on_select.call(hit);
        }
    };

    // Drag state (mouse)
    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start_x = use_signal(|| 0.0_f64);
    let mut drag_start_y = use_signal(|| 0.0_f64);
    let mut drag_start_pan_x = use_signal(|| 0.0_f64);
    let mut drag_start_pan_y = use_signal(|| 0.0_f64);

    // Touch state
    let mut touch_start_pos = use_signal(|| None::<(f64, f64)>);
    let mut touch_did_pan = use_signal(|| false);
    let mut touch_start_pan_x = use_signal(|| 0.0_f64);
    let mut touch_start_pan_y = use_signal(|| 0.0_f64);
    let mut is_pinching = use_signal(|| false);
    let mut pinch_start_distance = use_signal(|| 0.0_f64);
    let mut pinch_start_zoom = use_signal(|| 1.0_f64);
    let mut pinch_midpoint = use_signal(|| (0.0_f64, 0.0_f64));
    let mut pinch_start_pan_x = use_signal(|| 0.0_f64);
    let mut pinch_start_pan_y = use_signal(|| 0.0_f64);

    // Pan is applied as a CSS transform outside the memo, so dragging does not
    // rebuild the SVG.
    let svg_html = use_memo(move || {
        let proj = *projection.read();
        let cur_zoom = *zoom.read();
        let content = build_svg_content(
            &markers.read(),
            &proj,
            cur_zoom,
            *selected.read(),
            &highlighted.read(),
        );
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" preserveAspectRatio="none" style="position:absolute;top:0;left:0;width:100%;height:100%;pointer-events:none;">{}</svg>"#,
            proj.width_px, proj.height_px, content
        )
    });

    let cur_pan_x = *pan_x.read();
    let cur_pan_y = *pan_y.read();
    let cur_zoom = *zoom.read();
    let transform_style = format!(
        "transform: translate({cur_pan_x}px, {cur_pan_y}px) scale({cur_zoom}); transform-origin: 0 0;"
    );
    let container_class = if *is_dragging.read() && *did_drag.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    let selected_key = *selected.read();
    let readout = selected_key.and_then(|key| {
        markers
            .read()
            .iter()
            .find(|m| m.device == Some(key))
            .map(|m| format!("{}: {}", m.label, format_lat_lon(m.latitude, m.longitude)))
    });
    let zoom_label = format!("{:.1}×", cur_zoom);

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onresize: move |evt: Event<ResizeData>| {
                if let Ok(box_size) = evt.data().get_content_box_size() {
                    if box_size.width > 0.0 && box_size.height > 0.0 {
                        size.set((box_size.width, box_size.height));
                    }
                }
            },

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let delta_y = wheel_delta_y(evt.data().delta());
                let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let (cx, cy) =
                    coords::client_to_container(client.x, client.y, rect.left(), rect.top());
                zoom_at(cx, cy, factor);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start_x.set(client.x);
                drag_start_y.set(client.y);
                drag_start_pan_x.set(*pan_x.read());
                drag_start_pan_y.set(*pan_y.read());
            },

            onmousemove: move |evt: Event<MouseData>| {
                if !*is_dragging.read() {
                    return;
                }
                let client = evt.client_coordinates();
                let dx = client.x - *drag_start_x.read();
                let dy = client.y - *drag_start_y.read();

                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    let new_px = *drag_start_pan_x.read() + dx;
                    let new_py = *drag_start_pan_y.read() + dy;
                    let (px, py) = clamp_pan_to_container(new_px, new_py, *zoom.read());
                    pan_x.set(px);
                    pan_y.set(py);
                }
            },

            onmouseup: move |evt: Event<MouseData>| {
                let was_dragging = *is_dragging.read();
                let was_drag = *did_drag.read();
                is_dragging.set(false);

                // A mouseup without drag movement is a click
                if was_dragging && !was_drag {
                    let client = evt.client_coordinates();
                    select_at(client.x, client.y);
                }
            },

            onmouseleave: move |_| {
                is_dragging.set(false);
            },

            ondoubleclick: move |evt: Event<MouseData>| {
                evt.prevent_default();
                reset_view();
            },

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();
                if touches.len() == 1 {
                    let t = &touches[0];
                    touch_start_pos.set(Some((t.client_coordinates().x, t.client_coordinates().y)));
                    touch_did_pan.set(false);
                    touch_start_pan_x.set(*pan_x.read());
                    touch_start_pan_y.set(*pan_y.read());
                } else if touches.len() >= 2 {
                    let t0 = &touches[0];
                    let t1 = &touches[1];
                    let p0 = (t0.client_coordinates().x, t0.client_coordinates().y);
                    let p1 = (t1.client_coordinates().x, t1.client_coordinates().y);
                    is_pinching.set(true);
                    pinch_start_distance.set(point_distance(p0, p1));
                    pinch_start_zoom.set(*zoom.read());
                    pinch_midpoint.set(((p0.0 + p1.0) / 2.0, (p0.1 + p1.1) / 2.0));
                    pinch_start_pan_x.set(*pan_x.read());
                    pinch_start_pan_y.set(*pan_y.read());
                    touch_start_pos.set(None);
                    touch_did_pan.set(true);
                }
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = evt.data().touches();

                if *is_pinching.read() && touches.len() >= 2 {
                    let t0 = &touches[0];
                    let t1 = &touches[1];
                    let p0 = (t0.client_coordinates().x, t0.client_coordinates().y);
                    let p1 = (t1.client_coordinates().x, t1.client_coordinates().y);
                    let start_d = *pinch_start_distance.read();
                    if start_d < 1.0 { return; }

                    let old_z = *pinch_start_zoom.read();
                    let new_z =
                        (old_z * point_distance(p0, p1) / start_d).clamp(ZOOM_MIN, ZOOM_MAX);

                    let Some(rect) = container_rect() else { return };
                    let mid = *pinch_midpoint.read();
                    let (cx, cy) =
                        coords::client_to_container(mid.0, mid.1, rect.left(), rect.top());
                    let (new_px, new_py) = zoom_pan_at_cursor(
                        cx, cy, old_z, new_z,
                        *pinch_start_pan_x.read(), *pinch_start_pan_y.read(),
                    );
                    let (px, py) = clamp_pan(new_px, new_py, new_z, rect.width(), rect.height());
                    zoom.set(new_z);
                    pan_x.set(px);
                    pan_y.set(py);
                } else if touches.len() == 1 {
                    let t = &touches[0];
                    let cur = (t.client_coordinates().x, t.client_coordinates().y);
                    if let Some(start) = *touch_start_pos.read() {
                        if !*touch_did_pan.read()
                            && point_distance(start, cur) > TOUCH_DRAG_THRESHOLD
                        {
                            touch_did_pan.set(true);
                        }
                        if *touch_did_pan.read() {
                            let new_px = *touch_start_pan_x.read() + cur.0 - start.0;
                            let new_py = *touch_start_pan_y.read() + cur.1 - start.1;
                            let (px, py) = clamp_pan_to_container(new_px, new_py, *zoom.read());
                            pan_x.set(px);
                            pan_y.set(py);
                        }
                    }
                }
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let remaining = evt.data().touches().len();

                if *is_pinching.read() {
                    // Wait for all fingers to lift before resetting pinch state
                    if remaining == 0 {
                        is_pinching.set(false);
                        touch_start_pos.set(None);
                    }
                    return;
                }

                if remaining == 0 && !*touch_did_pan.read() {
                    if let Some(start) = *touch_start_pos.read() {
                        select_at(start.0, start.1);
                    }
                }
                if remaining == 0 {
                    touch_start_pos.set(None);
                }
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                touch_start_pos.set(None);
                touch_did_pan.set(false);
                is_pinching.set(false);
            },

            div {
                class: "map-inner",
                style: "{transform_style}",
                div {
                    class: "map-layer",
                    dangerous_inner_html: "{svg_html}",
                }
            }

            div { class: "map-controls",
                button {
                    title: "Zoom in",
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onclick: move |_| {
                        let (w, h) = *size.peek();
                        zoom_at(w / 2.0, h / 2.0, 2.0);
                    },
                    "+"
                }
                button {
                    title: "Zoom out",
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onclick: move |_| {
                        let (w, h) = *size.peek();
                        zoom_at(w / 2.0, h / 2.0, 0.5);
                    },
                    "−"
                }
                button {
                    title: "Fit all positions",
                    onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
                    onclick: move |_| reset_view(),
                    "⤢"
                }
            }

            div { class: "coord-readout",
                if let Some(text) = readout {
                    span { class: "coord-tag", "{text}" }
                }
                span { class: "coord-tag", "{zoom_label}" }
            }
        }
    }
}
