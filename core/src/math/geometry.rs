/// Converts a speed and heading (radians) into a Cartesian velocity.
pub fn polar_to_cartesian(magnitude: f32, heading: f32) -> (f32, f32) {
    (heading.cos() * magnitude, heading.sin() * magnitude)
}

/// Pixels whose integer coordinates fall within `radius` of `(cx, cy)`,
/// clipped to a `width` x `height` field.
pub fn disc_pixels(
    cx: f32,
    cy: f32,
    radius: f32,
    width: usize,
    height: usize,
) -> impl Iterator<Item = (usize, usize)> {
    let r2 = radius * radius;
    let x0 = clip_floor(cx - radius, width);
    let x1 = clip_ceil(cx + radius, width);
    let y0 = clip_floor(cy - radius, height);
    let y1 = clip_ceil(cy + radius, height);

    (y0..y1).flat_map(move |y| {
        (x0..x1).filter_map(move |x| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            (dx * dx + dy * dy <= r2).then_some((x, y))
        })
    })
}

/// Samples a segment at unit spacing, yielding in-bounds pixels with the
/// fraction `t` in `[0, 1]` travelled from the start point.
pub fn line_pixels(
    start: (f32, f32),
    end: (f32, f32),
    width: usize,
    height: usize,
) -> Vec<(usize, usize, f32)> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    let mut pixels = Vec::with_capacity(steps + 1);

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = (start.0 + dx * t).round();
        let y = (start.1 + dy * t).round();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let (x, y) = (x as usize, y as usize);
        if x < width && y < height {
            pixels.push((x, y, t));
        }
    }
    pixels
}

fn clip_floor(value: f32, limit: usize) -> usize {
    value.floor().clamp(0.0, limit as f32) as usize
}

/// Exclusive upper bound.
fn clip_ceil(value: f32, limit: usize) -> usize {
    (value.ceil() + 1.0).clamp(0.0, limit as f32) as usize
}
