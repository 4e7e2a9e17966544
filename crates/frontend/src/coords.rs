/// Convert client (viewport) coordinates to container-relative pixel coordinates.
pub fn client_to_container(
    client_x: f64,
    client_y: f64,
    rect_left: f64,
    rect_top: f64,
) -> (f64, f64) {
    (client_x - rect_left, client_y - rect_top)
}

/// Undo the `translate(pan) scale(zoom)` transform applied to the map layer,
/// giving coordinates in the untransformed layer (the projection's pixel space).
pub fn container_to_layer(
    container_x: f64,
    container_y: f64,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
) -> Option<(f64, f64)> {
    if zoom <= 0.0 {
        return None;
    }
    Some(((container_x - pan_x) / zoom, (container_y - pan_y) / zoom))
}

/// Map a click in client coordinates to layer pixels using the live
/// bounding rect of `container_id`.
pub fn click_to_layer_px(
    client_x: f64,
    client_y: f64,
    container_id: &str,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
) -> Option<(f64, f64)> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(container_id)?;
    let rect = element.get_bounding_client_rect();
    if rect.width() <= 0.0 {
        return None;
    }
    let (cx, cy) = client_to_container(client_x, client_y, rect.left(), rect.top());
    container_to_layer(cx, cy, zoom, pan_x, pan_y)
}
